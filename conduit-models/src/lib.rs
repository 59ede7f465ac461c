use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute key every fan-out message is routed on
pub const CHANNEL_ATTRIBUTE: &str = "channel";
pub const ACCOUNT_ATTRIBUTE: &str = "account";
pub const TIMESTAMP_ATTRIBUTE: &str = "timestamp";

/// A provisioned channel as recorded in the registry.
///
/// The serialized field names are the public wire format returned by the
/// create endpoint and the list scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Channel {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "TableARN")]
    pub table_arn: String,
    #[serde(rename = "QueueARN")]
    pub queue_arn: String,
    #[serde(rename = "EndpointTopicARN")]
    pub endpoint_topic_arn: String,
    #[serde(rename = "SubscriptionARN")]
    pub subscription_arn: String,
}

impl Channel {
    /// True when every owned resource reference is populated
    pub fn has_complete_refs(&self) -> bool {
        [
            &self.table_arn,
            &self.queue_arn,
            &self.endpoint_topic_arn,
            &self.subscription_arn,
        ]
        .iter()
        .all(|r| !r.is_empty())
    }
}

// ============================================================================
// Request bodies
// ============================================================================

/// Body of a create request: `{"name": "..."}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateChannelRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of a delete request: `{"id": "..."}` or `{"name": "..."}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeleteChannelRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of an update request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateChannelRequest {
    /// Channel id (numeric) or alias
    pub channel: String,
    /// Requesting account, recorded for auditing only
    #[serde(default)]
    pub account: String,
    pub request: ChannelRequest,
}

/// Tagged action with its parameter objects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelRequest {
    pub action: String,
    #[serde(default)]
    pub parameters: Vec<BTreeMap<String, String>>,
}

/// Query string of the list endpoint (`?type=all`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListChannelsQuery {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Body accepted by the publish endpoint. Numeric fields arrive as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishMessageRequest {
    pub message: String,
    pub channel: String,
    pub account: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishMessageResponse {
    pub message_id: String,
}

// ============================================================================
// Messages
// ============================================================================

/// A message persisted into a channel's table, keyed by account + timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRecord {
    pub channel: String,
    pub account: i64,
    pub timestamp: i64,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageAttribute {
    #[serde(rename = "Type")]
    pub data_type: AttributeType,
    #[serde(rename = "Value")]
    pub value: String,
}

impl MessageAttribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self { data_type: AttributeType::String, value: value.into() }
    }

    pub fn number(value: i64) -> Self {
        Self { data_type: AttributeType::Number, value: value.to_string() }
    }
}

pub type MessageAttributes = BTreeMap<String, MessageAttribute>;

/// Notification body delivered into a subscribed queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(rename = "MessageId")]
    pub message_id: String,
    #[serde(rename = "TopicArn")]
    pub topic_arn: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "MessageAttributes", default)]
    pub message_attributes: MessageAttributes,
}

impl Envelope {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.message_attributes.get(name).map(|a| a.value.as_str())
    }
}

/// Subscription filter policy: every key must be present on the message
/// and carry one of the listed values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FilterPolicy(pub BTreeMap<String, Vec<String>>);

impl FilterPolicy {
    /// Policy that only admits messages tagged for `alias`
    pub fn for_channel(alias: &str) -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(CHANNEL_ATTRIBUTE.to_string(), vec![alias.to_string()]);
        Self(rules)
    }

    pub fn matches(&self, attributes: &MessageAttributes) -> bool {
        self.0.iter().all(|(key, allowed)| {
            attributes
                .get(key)
                .map(|attr| allowed.iter().any(|v| v == &attr.value))
                .unwrap_or(false)
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}
