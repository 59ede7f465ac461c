use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{FindEventBindingInput, FindEventBindingOutput};
use crate::error::{ChannelError, Result};
use crate::topology::ChannelServices;

pub async fn find_event_binding_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: FindEventBindingInput,
) -> std::result::Result<FindEventBindingOutput, String> {
    let mapping_uuid = find_binding(&services, &input.queue_arn, &input.function).await?;

    if mapping_uuid.is_none() {
        ctx.trace_warn(format!(
            "No binding from {} to {}",
            input.queue_arn, input.function
        ));
    }

    Ok(FindEventBindingOutput { mapping_uuid })
}

/// The binding id is not kept in the registry, so it is rediscovered by
/// listing the worker's mappings and matching the queue ARN exactly
pub(crate) async fn find_binding(
    services: &ChannelServices,
    queue_arn: &str,
    function: &str,
) -> Result<Option<String>> {
    let mappings = services
        .bindings
        .list_event_source_mappings(function)
        .await
        .map_err(ChannelError::remote("find-event-binding"))?;

    Ok(mappings
        .into_iter()
        .find(|m| m.event_source_arn == queue_arn)
        .map(|m| m.uuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{EventBindingService, QueueService};
    use crate::test_support::local_services;

    #[tokio::test]
    async fn test_matches_queue_arn_exactly() {
        let (services, cloud) = local_services().await;
        let function = cloud.function_arn("handleMessageQueue");

        // "news" is a prefix of "news2"; only an exact match may be picked
        for name in ["news2ChannelQueue", "newsChannelQueue"] {
            let url = cloud.create_queue(name, "{}").await.unwrap();
            let arn = cloud.get_queue_arn(&url).await.unwrap();
            cloud.create_event_source_mapping(&arn, &function).await.unwrap();
        }

        let wanted = cloud.queue_arn("newsChannelQueue");
        let found = find_binding(&services, &wanted, &function).await.unwrap();

        let mappings = cloud.list_event_source_mappings(&function).await.unwrap();
        let expected = mappings.iter().find(|m| m.event_source_arn == wanted).unwrap();
        assert_eq!(found.as_deref(), Some(expected.uuid.as_str()));
    }

    #[tokio::test]
    async fn test_missing_binding_is_none() {
        let (services, cloud) = local_services().await;
        let found = find_binding(
            &services,
            &cloud.queue_arn("ghostChannelQueue"),
            &cloud.function_arn("handleMessageQueue"),
        )
        .await
        .unwrap();
        assert_eq!(found, None);
    }
}
