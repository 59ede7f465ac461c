//! Create channel orchestration

use conduit_models::Channel;
use duroxide::OrchestrationContext;

use super::activity_output;
use crate::activity_names::activities;
use crate::activity_types::{
    BindEventSourceInput, BindEventSourceOutput, CheckAliasAvailableInput,
    CheckAliasAvailableOutput, CreateEndpointTopicInput, CreateEndpointTopicOutput,
    CreateQueueInput, CreateQueueOutput, CreateTableInput, CreateTableOutput, GetQueueArnInput,
    GetQueueArnOutput, RegisterChannelInput, RegisterChannelOutput, ResolveWorkerInput,
    ResolveWorkerOutput, SubscribeQueueInput, SubscribeQueueOutput,
};
use crate::naming::validate_alias;
use crate::saga::{Compensation, Saga};
use crate::types::{CreateChannelInput, CreateChannelOutput};

pub async fn create_channel_orchestration(
    ctx: OrchestrationContext,
    input: CreateChannelInput,
) -> Result<CreateChannelOutput, String> {
    ctx.trace_info(format!(
        "Creating channel '{}' (orchestration: {})",
        input.alias, input.orchestration_id
    ));

    let start_time = ctx
        .utcnow()
        .await
        .map_err(|e| format!("Failed to get start time: {}", e))?;

    validate_alias(&input.alias)?;

    ctx.schedule_activity_typed::<CheckAliasAvailableInput, CheckAliasAvailableOutput>(
        activities::registry::CHECK_ALIAS_AVAILABLE,
        &CheckAliasAvailableInput {
            alias: input.alias.clone(),
            owner_id: None,
        },
    )
    .into_activity_typed::<CheckAliasAvailableOutput>()
    .await?;

    let mut saga = Saga::new();
    let channel = match provision(&ctx, &input, &mut saga).await {
        Ok(channel) => channel,
        Err(e) => {
            ctx.trace_error(format!("Provisioning '{}' failed: {}", input.alias, e));
            saga.compensate(&ctx).await;
            return Err(e);
        }
    };

    let end_time = ctx
        .utcnow()
        .await
        .map_err(|e| format!("Failed to get end time: {}", e))?;
    let provisioning_ms = end_time
        .duration_since(start_time)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    ctx.trace_info(format!(
        "Channel '{}' ready as id {} ({} ms)",
        channel.alias, channel.id, provisioning_ms
    ));

    Ok(CreateChannelOutput {
        channel,
        provisioning_ms,
    })
}

async fn provision(
    ctx: &OrchestrationContext,
    input: &CreateChannelInput,
    saga: &mut Saga,
) -> Result<Channel, String> {
    let alias = &input.alias;

    // Step 1: independent resources. Every branch runs to completion so each
    // success is recorded before anything is undone.
    ctx.trace_info("Step 1: Creating table, queue, endpoint topic; resolving worker");

    let mut step1 = ctx
        .join(vec![
            ctx.schedule_activity_typed::<CreateTableInput, CreateTableOutput>(
                activities::CREATE_TABLE,
                &CreateTableInput { alias: alias.clone() },
            ),
            ctx.schedule_activity_typed::<CreateQueueInput, CreateQueueOutput>(
                activities::CREATE_QUEUE,
                &CreateQueueInput { alias: alias.clone() },
            ),
            ctx.schedule_activity_typed::<CreateEndpointTopicInput, CreateEndpointTopicOutput>(
                activities::CREATE_ENDPOINT_TOPIC,
                &CreateEndpointTopicInput { alias: alias.clone() },
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

    let table = activity_output::<CreateTableOutput>(step1.next());
    let queue = activity_output::<CreateQueueOutput>(step1.next());
    let topic = activity_output::<CreateEndpointTopicOutput>(step1.next());
    let worker = activity_output::<ResolveWorkerOutput>(step1.next());

    if let Ok(table) = &table {
        saga.record(Compensation::DeleteTable {
            table_arn: table.table_arn.clone(),
        });
    }
    if let Ok(queue) = &queue {
        saga.record(Compensation::DeleteQueue {
            queue_url: queue.queue_url.clone(),
        });
    }
    if let Ok(topic) = &topic {
        saga.record(Compensation::DeleteEndpointTopic {
            topic_arn: topic.topic_arn.clone(),
        });
    }

    let (table, queue, topic, worker) = (table?, queue?, topic?, worker?);

    let queue_arn = ctx
        .schedule_activity_typed::<GetQueueArnInput, GetQueueArnOutput>(
            activities::GET_QUEUE_ARN,
            &GetQueueArnInput {
                queue_url: queue.queue_url,
            },
        )
        .into_activity_typed::<GetQueueArnOutput>()
        .await?
        .queue_arn;

    // Step 2: wiring that needs the queue ARN
    ctx.trace_info("Step 2: Subscribing queue and binding worker");

    let mut step2 = ctx
        .join(vec![
            ctx.schedule_activity_typed::<SubscribeQueueInput, SubscribeQueueOutput>(
                activities::SUBSCRIBE_QUEUE,
                &SubscribeQueueInput {
                    topic_arn: input.fan_out_topic_arn.clone(),
                    queue_arn: queue_arn.clone(),
                    alias: alias.clone(),
                },
            ),
            ctx.schedule_activity_typed::<BindEventSourceInput, BindEventSourceOutput>(
                activities::BIND_EVENT_SOURCE,
                &BindEventSourceInput {
                    queue_arn: queue_arn.clone(),
                    function: worker.function,
                },
            ),
        ])
        .await
        .into_iter();

    let subscription = activity_output::<SubscribeQueueOutput>(step2.next());
    let binding = activity_output::<BindEventSourceOutput>(step2.next());

    if let Ok(subscription) = &subscription {
        saga.record(Compensation::Unsubscribe {
            subscription_arn: subscription.subscription_arn.clone(),
        });
    }
    if let Ok(binding) = &binding {
        saga.record(Compensation::RemoveEventBinding {
            mapping_uuid: binding.mapping_uuid.clone(),
        });
    }

    let (subscription, _binding) = (subscription?, binding?);

    // Step 3: registry row, only once every resource exists
    ctx.trace_info("Step 3: Registering channel");
    let registered = ctx
        .schedule_activity_typed::<RegisterChannelInput, RegisterChannelOutput>(
            activities::registry::REGISTER_CHANNEL,
            &RegisterChannelInput {
                alias: alias.clone(),
                table_arn: table.table_arn,
                queue_arn,
                endpoint_topic_arn: topic.topic_arn,
                subscription_arn: subscription.subscription_arn,
            },
        )
        .into_activity_typed::<RegisterChannelOutput>()
        .await?;

    Ok(registered.channel)
}
