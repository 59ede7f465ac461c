use std::sync::Arc;

use conduit_models::Channel;
use duroxide::ActivityContext;

use crate::activity_types::{RegisterChannelInput, RegisterChannelOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

/// Last step of provisioning: allocate the id and write the row
pub async fn register_channel_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: RegisterChannelInput,
) -> Result<RegisterChannelOutput, String> {
    let registry = &services.registry;
    let id = registry.next_id().await.map_err(ChannelError::from)?;

    let channel = Channel {
        id,
        alias: input.alias,
        table_arn: input.table_arn,
        queue_arn: input.queue_arn,
        endpoint_topic_arn: input.endpoint_topic_arn,
        subscription_arn: input.subscription_arn,
    };

    if !channel.has_complete_refs() {
        return Err(ChannelError::Validation(format!(
            "refusing to register channel '{}' with missing resource references",
            channel.alias
        ))
        .into());
    }

    registry.insert(&channel).await.map_err(ChannelError::from)?;
    ctx.trace_info(format!("Registered channel {} as '{}'", channel.id, channel.alias));

    Ok(RegisterChannelOutput { channel })
}
