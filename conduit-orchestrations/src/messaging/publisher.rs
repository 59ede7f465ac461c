use std::sync::Arc;

use conduit_models::{
    MessageAttribute, MessageAttributes, PublishMessageRequest, ACCOUNT_ATTRIBUTE,
    CHANNEL_ATTRIBUTE, TIMESTAMP_ATTRIBUTE,
};

use super::parse_number;
use crate::cloud::TopicService;
use crate::error::{ChannelError, Result};
use crate::naming::validate_alias;

/// Publishes inbound messages to the shared fan-out topic, where the
/// per-channel filter policies route them
#[derive(Clone)]
pub struct MessagePublisher {
    topics: Arc<dyn TopicService>,
    fan_out_topic_arn: String,
}

impl MessagePublisher {
    pub fn new(topics: Arc<dyn TopicService>, fan_out_topic_arn: impl Into<String>) -> Self {
        Self {
            topics,
            fan_out_topic_arn: fan_out_topic_arn.into(),
        }
    }

    pub async fn publish(&self, request: &PublishMessageRequest) -> Result<String> {
        validate_alias(&request.channel)?;
        let account = parse_number(ACCOUNT_ATTRIBUTE, &request.account)?;
        let timestamp = parse_number(TIMESTAMP_ATTRIBUTE, &request.timestamp)?;

        let mut attributes = MessageAttributes::new();
        attributes.insert(CHANNEL_ATTRIBUTE.to_string(), MessageAttribute::string(&request.channel));
        attributes.insert(ACCOUNT_ATTRIBUTE.to_string(), MessageAttribute::number(account));
        attributes.insert(TIMESTAMP_ATTRIBUTE.to_string(), MessageAttribute::number(timestamp));

        let message_id = self
            .topics
            .publish(&self.fan_out_topic_arn, &request.message, &attributes)
            .await
            .map_err(ChannelError::remote("publish-message"))?;

        tracing::debug!(
            channel = %request.channel,
            account,
            timestamp,
            message_id = %message_id,
            "Message published to fan-out topic"
        );
        Ok(message_id)
    }
}
