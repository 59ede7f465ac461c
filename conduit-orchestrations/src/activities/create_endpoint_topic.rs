use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{CreateEndpointTopicInput, CreateEndpointTopicOutput};
use crate::error::ChannelError;
use crate::naming::endpoint_topic_name;
use crate::topology::ChannelServices;

/// An existing topic with this name is a conflict, never adopted: it may
/// belong to a channel that was renamed away from this alias
pub async fn create_endpoint_topic_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: CreateEndpointTopicInput,
) -> Result<CreateEndpointTopicOutput, String> {
    let name = endpoint_topic_name(&input.alias);
    ctx.trace_info(format!("Creating endpoint topic {}", name));

    let topic_arn = services
        .topics
        .create_topic(&name)
        .await
        .map_err(ChannelError::creating("create-endpoint-topic"))?;

    Ok(CreateEndpointTopicOutput { topic_arn })
}
