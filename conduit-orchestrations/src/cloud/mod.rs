//! Resource service contracts consumed by the orchestrations
//!
//! Each trait mirrors one managed service. Calls are single remote
//! operations; ordering, concurrency and compensation live in the
//! orchestrations, never here.

use async_trait::async_trait;
use conduit_models::{FilterPolicy, MessageAttributes, MessageRecord};

use crate::error::CloudError;

mod local;

pub use local::{ops, LocalCloud, PublishedMessage};

pub type CloudResult<T> = std::result::Result<T, CloudError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl KeyAttribute {
    pub fn number(name: &str) -> Self {
        Self { name: name.to_string(), kind: AttributeKind::Number }
    }

    pub fn string(name: &str) -> Self {
        Self { name: name.to_string(), kind: AttributeKind::String }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: KeyAttribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamView {
    NewAndOldImages,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: KeyAttribute,
    pub secondary_indexes: Vec<SecondaryIndex>,
    pub pay_per_request: bool,
    pub stream: Option<StreamView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub name: String,
    pub arn: String,
}

/// A message pulled from a queue. `body` is the JSON envelope written by the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSourceMapping {
    pub uuid: String,
    pub event_source_arn: String,
    pub function: String,
}

#[async_trait]
pub trait TableService: Send + Sync {
    async fn create_table(&self, spec: &TableSpec) -> CloudResult<TableDescription>;

    async fn delete_table(&self, table_arn: &str) -> CloudResult<()>;

    async fn put_item(&self, table_arn: &str, record: &MessageRecord) -> CloudResult<()>;

    async fn get_item(
        &self,
        table_arn: &str,
        account: i64,
        timestamp: i64,
    ) -> CloudResult<Option<MessageRecord>>;
}

#[async_trait]
pub trait QueueService: Send + Sync {
    /// Returns the queue URL
    async fn create_queue(&self, name: &str, policy: &str) -> CloudResult<String>;

    async fn get_queue_arn(&self, queue_url: &str) -> CloudResult<String>;

    async fn get_queue_url(&self, name: &str) -> CloudResult<String>;

    async fn delete_queue(&self, queue_url: &str) -> CloudResult<()>;

    /// Receive up to `max` messages, removing them from the queue
    async fn receive_messages(&self, queue_url: &str, max: usize) -> CloudResult<Vec<QueueMessage>>;
}

#[async_trait]
pub trait TopicService: Send + Sync {
    async fn create_topic(&self, name: &str) -> CloudResult<String>;

    async fn delete_topic(&self, topic_arn: &str) -> CloudResult<()>;

    /// Subscribe a queue to a topic. Returns the subscription ARN.
    async fn subscribe(
        &self,
        topic_arn: &str,
        queue_arn: &str,
        filter: &FilterPolicy,
    ) -> CloudResult<String>;

    async fn unsubscribe(&self, subscription_arn: &str) -> CloudResult<()>;

    async fn set_filter_policy(&self, subscription_arn: &str, filter: &FilterPolicy) -> CloudResult<()>;

    /// Returns the message id
    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        attributes: &MessageAttributes,
    ) -> CloudResult<String>;
}

#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get_parameter(&self, name: &str) -> CloudResult<String>;
}

#[async_trait]
pub trait EventBindingService: Send + Sync {
    /// Returns the mapping UUID
    async fn create_event_source_mapping(&self, source_arn: &str, function: &str) -> CloudResult<String>;

    async fn list_event_source_mappings(&self, function: &str) -> CloudResult<Vec<EventSourceMapping>>;

    async fn delete_event_source_mapping(&self, uuid: &str) -> CloudResult<()>;
}
