use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{DeleteEndpointTopicInput, DeleteEndpointTopicOutput};
use crate::error::{ChannelError, CloudError};
use crate::topology::ChannelServices;

pub async fn delete_endpoint_topic_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: DeleteEndpointTopicInput,
) -> Result<DeleteEndpointTopicOutput, String> {
    ctx.trace_info(format!("Deleting endpoint topic {}", input.topic_arn));

    match services.topics.delete_topic(&input.topic_arn).await {
        Ok(()) => Ok(DeleteEndpointTopicOutput { deleted: true }),
        Err(CloudError::NotFound { .. }) => {
            ctx.trace_info("Endpoint topic not found, skipping");
            Ok(DeleteEndpointTopicOutput { deleted: false })
        }
        Err(e) => Err(ChannelError::remote("delete-endpoint-topic")(e).into()),
    }
}
