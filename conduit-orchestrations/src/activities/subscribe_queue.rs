use std::sync::Arc;

use conduit_models::FilterPolicy;
use duroxide::ActivityContext;

use crate::activity_types::{SubscribeQueueInput, SubscribeQueueOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

pub async fn subscribe_queue_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: SubscribeQueueInput,
) -> Result<SubscribeQueueOutput, String> {
    let filter = FilterPolicy::for_channel(&input.alias);
    ctx.trace_info(format!(
        "Subscribing {} to {} with filter {}",
        input.queue_arn,
        input.topic_arn,
        filter.to_json()
    ));

    let subscription_arn = services
        .topics
        .subscribe(&input.topic_arn, &input.queue_arn, &filter)
        .await
        .map_err(ChannelError::remote("subscribe-queue"))?;

    Ok(SubscribeQueueOutput { subscription_arn })
}
