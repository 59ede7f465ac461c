//! Delete channel orchestration

use duroxide::OrchestrationContext;

use super::activity_output;
use crate::activity_names::activities;
use crate::activity_types::{
    DeleteChannelRecordInput, DeleteChannelRecordOutput, DeleteEndpointTopicInput,
    DeleteEndpointTopicOutput, DeleteQueueInput, DeleteQueueOutput, DeleteTableInput,
    DeleteTableOutput, FindEventBindingInput, FindEventBindingOutput, GetQueueUrlInput,
    GetQueueUrlOutput, ResolveChannelInput, ResolveChannelOutput, ResolveWorkerInput,
    ResolveWorkerOutput, UnbindEventSourceInput, UnbindEventSourceOutput, UnsubscribeQueueInput,
    UnsubscribeQueueOutput,
};
use crate::types::{DeleteChannelInput, DeleteChannelOutput};

pub async fn delete_channel_orchestration(
    ctx: OrchestrationContext,
    input: DeleteChannelInput,
) -> Result<DeleteChannelOutput, String> {
    ctx.trace_info(format!(
        "Deleting channel {} (orchestration: {})",
        input.key, input.orchestration_id
    ));

    // Every reference is read before anything is destroyed
    let channel = ctx
        .schedule_activity_typed::<ResolveChannelInput, ResolveChannelOutput>(
            activities::registry::RESOLVE_CHANNEL,
            &ResolveChannelInput { key: input.key.clone() },
        )
        .into_activity_typed::<ResolveChannelOutput>()
        .await?
        .channel;

    // Step 1: table delete and lookups have no ordering between them
    ctx.trace_info("Step 1: Deleting table, locating queue and worker");

    let mut step1 = ctx
        .join(vec![
            ctx.schedule_activity_typed::<DeleteTableInput, DeleteTableOutput>(
                activities::DELETE_TABLE,
                &DeleteTableInput {
                    table_arn: channel.table_arn.clone(),
                },
            ),
            ctx.schedule_activity_typed::<GetQueueUrlInput, GetQueueUrlOutput>(
                activities::GET_QUEUE_URL,
                &GetQueueUrlInput {
                    queue_arn: channel.queue_arn.clone(),
                },
            ),
            ctx.schedule_activity_typed::<ResolveWorkerInput, ResolveWorkerOutput>(
                activities::RESOLVE_WORKER,
                &ResolveWorkerInput {
                    parameter: input.worker_parameter.clone(),
                },
            ),
        ])
        .await
        .into_iter();

    let table = activity_output::<DeleteTableOutput>(step1.next())?;
    let queue_url = activity_output::<GetQueueUrlOutput>(step1.next())?;
    let worker = activity_output::<ResolveWorkerOutput>(step1.next())?;

    let mapping_uuid = ctx
        .schedule_activity_typed::<FindEventBindingInput, FindEventBindingOutput>(
            activities::FIND_EVENT_BINDING,
            &FindEventBindingInput {
                queue_arn: channel.queue_arn.clone(),
                function: worker.function,
            },
        )
        .into_activity_typed::<FindEventBindingOutput>()
        .await?
        .mapping_uuid;

    // Step 2: remaining resources in order
    ctx.trace_info("Step 2: Deleting queue, subscription, endpoint topic and binding");

    let queue_deleted = match queue_url.queue_url {
        Some(queue_url) => {
            ctx.schedule_activity_typed::<DeleteQueueInput, DeleteQueueOutput>(
                activities::DELETE_QUEUE,
                &DeleteQueueInput { queue_url },
            )
            .into_activity_typed::<DeleteQueueOutput>()
            .await?
            .deleted
        }
        None => false,
    };

    let unsubscribed = ctx
        .schedule_activity_typed::<UnsubscribeQueueInput, UnsubscribeQueueOutput>(
            activities::UNSUBSCRIBE_QUEUE,
            &UnsubscribeQueueInput {
                subscription_arn: channel.subscription_arn.clone(),
            },
        )
        .into_activity_typed::<UnsubscribeQueueOutput>()
        .await?
        .unsubscribed;

    let topic_deleted = ctx
        .schedule_activity_typed::<DeleteEndpointTopicInput, DeleteEndpointTopicOutput>(
            activities::DELETE_ENDPOINT_TOPIC,
            &DeleteEndpointTopicInput {
                topic_arn: channel.endpoint_topic_arn.clone(),
            },
        )
        .into_activity_typed::<DeleteEndpointTopicOutput>()
        .await?
        .deleted;

    let unbound = match mapping_uuid {
        Some(mapping_uuid) => {
            ctx.schedule_activity_typed::<UnbindEventSourceInput, UnbindEventSourceOutput>(
                activities::UNBIND_EVENT_SOURCE,
                &UnbindEventSourceInput { mapping_uuid },
            )
            .into_activity_typed::<UnbindEventSourceOutput>()
            .await?
            .removed
        }
        None => false,
    };

    // Step 3: the registry row goes last so a failed run can be retried
    ctx.trace_info("Step 3: Removing registry row");
    ctx.schedule_activity_typed::<DeleteChannelRecordInput, DeleteChannelRecordOutput>(
        activities::registry::DELETE_CHANNEL_RECORD,
        &DeleteChannelRecordInput { id: channel.id },
    )
    .into_activity_typed::<DeleteChannelRecordOutput>()
    .await?;

    ctx.trace_info(format!(
        "Channel {} deleted (table: {}, queue: {}, subscription: {}, topic: {}, binding: {})",
        channel.id, table.deleted, queue_deleted, unsubscribed, topic_deleted, unbound
    ));

    Ok(DeleteChannelOutput { channel })
}
