use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{GetQueueArnInput, GetQueueArnOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

pub async fn get_queue_arn_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: GetQueueArnInput,
) -> Result<GetQueueArnOutput, String> {
    let queue_arn = services
        .queues
        .get_queue_arn(&input.queue_url)
        .await
        .map_err(ChannelError::remote("get-queue-arn"))?;

    ctx.trace_info(format!("Queue ARN: {}", queue_arn));
    Ok(GetQueueArnOutput { queue_arn })
}
