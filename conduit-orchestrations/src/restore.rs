//! Rebuild in-process resources for channels a durable registry remembers
//!
//! [`LocalCloud`](crate::cloud::LocalCloud) forgets everything on restart
//! while a Postgres registry keeps its rows. Before serving, every
//! registered channel gets its table, queue, endpoint topic, subscription and
//! worker binding back under the names recorded in its row. Messages held by
//! the old process are gone.

use conduit_models::{Channel, FilterPolicy};

use crate::cloud::TableSpec;
use crate::error::{ChannelError, CloudError, Result};
use crate::naming::{channel_table_spec, queue_delivery_policy, resource_name};
use crate::topology::ChannelServices;

/// Recreate the resources of every registered channel. Returns how many
/// channels were restored.
pub async fn restore_channels(services: &ChannelServices) -> Result<usize> {
    let channels = services.registry.list().await?;
    if channels.is_empty() {
        return Ok(0);
    }

    tracing::warn!(
        "Registry holds {} channel(s) but the resource backend is in-process; recreating their resources",
        channels.len()
    );

    let function = services
        .parameters
        .get_parameter(&services.topology.worker_parameter)
        .await
        .map_err(ChannelError::remote("restore-resolve-worker"))?;

    for channel in &channels {
        restore_channel(services, channel, &function).await?;
    }

    tracing::info!("Restored {} channel(s)", channels.len());
    Ok(channels.len())
}

async fn restore_channel(services: &ChannelServices, channel: &Channel, function: &str) -> Result<()> {
    tracing::debug!("Restoring channel {} ('{}')", channel.id, channel.alias);

    // Physical names come from the row; the alias may have changed since creation
    let spec = TableSpec {
        name: resource_name(&channel.table_arn).to_string(),
        ..channel_table_spec(&channel.alias)
    };
    tolerate_existing(services.tables.create_table(&spec).await)
        .map_err(ChannelError::remote("restore-table"))?;

    tolerate_existing(
        services
            .queues
            .create_queue(resource_name(&channel.queue_arn), &queue_delivery_policy())
            .await,
    )
    .map_err(ChannelError::remote("restore-queue"))?;

    tolerate_existing(
        services
            .topics
            .create_topic(resource_name(&channel.endpoint_topic_arn))
            .await,
    )
    .map_err(ChannelError::remote("restore-endpoint-topic"))?;

    let subscription_arn = services
        .topics
        .subscribe(
            &services.topology.fan_out_topic_arn,
            &channel.queue_arn,
            &FilterPolicy::for_channel(&channel.alias),
        )
        .await
        .map_err(ChannelError::remote("restore-subscription"))?;
    services
        .registry
        .update_subscription(channel.id, &subscription_arn)
        .await?;

    services
        .bindings
        .create_event_source_mapping(&channel.queue_arn, function)
        .await
        .map_err(ChannelError::remote("restore-binding"))?;

    Ok(())
}

fn tolerate_existing<T>(result: std::result::Result<T, CloudError>) -> std::result::Result<(), CloudError> {
    match result {
        Ok(_) | Err(CloudError::AlreadyExists { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
