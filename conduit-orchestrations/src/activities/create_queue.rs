use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{CreateQueueInput, CreateQueueOutput};
use crate::error::ChannelError;
use crate::naming::{queue_delivery_policy, queue_name};
use crate::topology::ChannelServices;

pub async fn create_queue_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: CreateQueueInput,
) -> Result<CreateQueueOutput, String> {
    let name = queue_name(&input.alias);
    ctx.trace_info(format!("Creating queue {}", name));

    let queue_url = services
        .queues
        .create_queue(&name, &queue_delivery_policy())
        .await
        .map_err(ChannelError::creating("create-queue"))?;

    Ok(CreateQueueOutput {
        queue_name: name,
        queue_url,
    })
}
