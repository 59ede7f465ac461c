//! Input and output types for channel activities

use conduit_models::Channel;
use serde::{Deserialize, Serialize};

use crate::types::ChannelKey;

// ============================================================================
// Table Activities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTableInput {
    /// Alias the table name is derived from
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTableOutput {
    pub table_name: String,
    pub table_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteTableInput {
    pub table_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteTableOutput {
    pub deleted: bool,
}

// ============================================================================
// Queue Activities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateQueueInput {
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateQueueOutput {
    pub queue_name: String,
    pub queue_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetQueueArnInput {
    pub queue_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetQueueArnOutput {
    pub queue_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetQueueUrlInput {
    /// Queue ARN recorded in the registry
    pub queue_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetQueueUrlOutput {
    /// None when the queue no longer exists
    pub queue_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteQueueInput {
    pub queue_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteQueueOutput {
    pub deleted: bool,
}

// ============================================================================
// Topic Activities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateEndpointTopicInput {
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateEndpointTopicOutput {
    pub topic_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteEndpointTopicInput {
    pub topic_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteEndpointTopicOutput {
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscribeQueueInput {
    /// Fan-out topic to subscribe to
    pub topic_arn: String,
    pub queue_arn: String,
    /// Alias the filter policy admits
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscribeQueueOutput {
    pub subscription_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnsubscribeQueueInput {
    pub subscription_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnsubscribeQueueOutput {
    pub unsubscribed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateFilterPolicyInput {
    pub subscription_arn: String,
    /// New alias to route on
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateFilterPolicyOutput {
    pub updated: bool,
}

// ============================================================================
// Worker Binding Activities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolveWorkerInput {
    /// Parameter store key holding the worker identifier
    pub parameter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolveWorkerOutput {
    pub function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindEventSourceInput {
    pub queue_arn: String,
    pub function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindEventSourceOutput {
    pub mapping_uuid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindEventBindingInput {
    pub queue_arn: String,
    pub function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindEventBindingOutput {
    /// None when no mapping has this queue as its source
    pub mapping_uuid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnbindEventSourceInput {
    pub mapping_uuid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnbindEventSourceOutput {
    pub removed: bool,
}

// ============================================================================
// Registry Activities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckAliasAvailableInput {
    pub alias: String,
    /// Channel allowed to already hold the alias (renames)
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckAliasAvailableOutput {
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolveChannelInput {
    pub key: ChannelKey,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolveChannelOutput {
    pub channel: Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterChannelInput {
    pub alias: String,
    pub table_arn: String,
    pub queue_arn: String,
    pub endpoint_topic_arn: String,
    pub subscription_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterChannelOutput {
    pub channel: Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateChannelAliasInput {
    pub id: i64,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateChannelAliasOutput {
    pub updated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteChannelRecordInput {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteChannelRecordOutput {
    pub deleted: bool,
}
