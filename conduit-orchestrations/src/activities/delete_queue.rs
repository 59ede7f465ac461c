use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{DeleteQueueInput, DeleteQueueOutput};
use crate::error::{ChannelError, CloudError};
use crate::topology::ChannelServices;

pub async fn delete_queue_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: DeleteQueueInput,
) -> Result<DeleteQueueOutput, String> {
    ctx.trace_info(format!("Deleting queue {}", input.queue_url));

    match services.queues.delete_queue(&input.queue_url).await {
        Ok(()) => Ok(DeleteQueueOutput { deleted: true }),
        Err(CloudError::NotFound { .. }) => {
            ctx.trace_info("Queue not found, skipping");
            Ok(DeleteQueueOutput { deleted: false })
        }
        Err(e) => Err(ChannelError::remote("delete-queue")(e).into()),
    }
}
