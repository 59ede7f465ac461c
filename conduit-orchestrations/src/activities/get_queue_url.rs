use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{GetQueueUrlInput, GetQueueUrlOutput};
use crate::error::{ChannelError, CloudError};
use crate::naming::resource_name;
use crate::topology::ChannelServices;

/// The registry keeps the queue ARN; deletion needs the URL
pub async fn get_queue_url_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: GetQueueUrlInput,
) -> Result<GetQueueUrlOutput, String> {
    let name = resource_name(&input.queue_arn);

    match services.queues.get_queue_url(name).await {
        Ok(queue_url) => Ok(GetQueueUrlOutput { queue_url: Some(queue_url) }),
        Err(CloudError::NotFound { .. }) => {
            ctx.trace_info(format!("Queue {} not found", name));
            Ok(GetQueueUrlOutput { queue_url: None })
        }
        Err(e) => Err(ChannelError::remote("get-queue-url")(e).into()),
    }
}
