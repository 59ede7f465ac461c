use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{UnsubscribeQueueInput, UnsubscribeQueueOutput};
use crate::error::{ChannelError, CloudError};
use crate::topology::ChannelServices;

pub async fn unsubscribe_queue_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: UnsubscribeQueueInput,
) -> Result<UnsubscribeQueueOutput, String> {
    ctx.trace_info(format!("Removing subscription {}", input.subscription_arn));

    match services.topics.unsubscribe(&input.subscription_arn).await {
        Ok(()) => Ok(UnsubscribeQueueOutput { unsubscribed: true }),
        Err(CloudError::NotFound { .. }) => {
            ctx.trace_info("Subscription not found, skipping");
            Ok(UnsubscribeQueueOutput { unsubscribed: false })
        }
        Err(e) => Err(ChannelError::remote("unsubscribe-queue")(e).into()),
    }
}
