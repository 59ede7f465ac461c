//! In-process cloud used for local runs and tests
//!
//! Implements every service trait against a single shared state so that
//! publishes to a topic are routed through subscription filter policies into
//! queues exactly as the managed services would.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use conduit_models::{Envelope, FilterPolicy, MessageAttributes, MessageRecord};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    CloudResult, EventBindingService, EventSourceMapping, ParameterStore, QueueMessage,
    QueueService, TableDescription, TableService, TableSpec, TopicService,
};
use crate::error::CloudError;

/// Operation names accepted by [`LocalCloud::fail_on`]
pub mod ops {
    pub const CREATE_TABLE: &str = "create-table";
    pub const DELETE_TABLE: &str = "delete-table";
    pub const PUT_ITEM: &str = "put-item";
    pub const CREATE_QUEUE: &str = "create-queue";
    pub const GET_QUEUE_ARN: &str = "get-queue-arn";
    pub const GET_QUEUE_URL: &str = "get-queue-url";
    pub const DELETE_QUEUE: &str = "delete-queue";
    pub const CREATE_TOPIC: &str = "create-topic";
    pub const DELETE_TOPIC: &str = "delete-topic";
    pub const SUBSCRIBE: &str = "subscribe";
    pub const UNSUBSCRIBE: &str = "unsubscribe";
    pub const SET_FILTER_POLICY: &str = "set-filter-policy";
    pub const PUBLISH: &str = "publish";
    pub const GET_PARAMETER: &str = "get-parameter";
    pub const CREATE_EVENT_SOURCE_MAPPING: &str = "create-event-source-mapping";
    pub const DELETE_EVENT_SOURCE_MAPPING: &str = "delete-event-source-mapping";
}

/// A message accepted by a topic, kept for inspection
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub message_id: String,
    pub message: String,
    pub attributes: MessageAttributes,
}

#[derive(Debug)]
struct LocalTable {
    spec: TableSpec,
    items: BTreeMap<(i64, i64), MessageRecord>,
}

#[derive(Debug)]
struct LocalQueue {
    name: String,
    arn: String,
    messages: VecDeque<QueueMessage>,
}

#[derive(Debug)]
struct LocalTopic {
    name: String,
    published: Vec<PublishedMessage>,
}

#[derive(Debug)]
struct LocalSubscription {
    topic_arn: String,
    endpoint: String,
    filter: FilterPolicy,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, LocalTable>,
    queues: HashMap<String, LocalQueue>,
    topics: HashMap<String, LocalTopic>,
    subscriptions: HashMap<String, LocalSubscription>,
    parameters: HashMap<String, String>,
    mappings: HashMap<String, EventSourceMapping>,
    fail_points: HashSet<String>,
}

impl State {
    fn check(&self, op: &str) -> CloudResult<()> {
        if self.fail_points.contains(op) {
            return Err(CloudError::Unavailable(format!("injected failure in {}", op)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalCloud {
    region: String,
    account: String,
    state: Arc<Mutex<State>>,
}

impl Default for LocalCloud {
    fn default() -> Self {
        Self::new("ap-southeast-2", "000000000000")
    }
}

impl LocalCloud {
    pub fn new(region: &str, account: &str) -> Self {
        Self {
            region: region.to_string(),
            account: account.to_string(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn table_arn(&self, name: &str) -> String {
        format!("arn:aws:dynamodb:{}:{}:table/{}", self.region, self.account, name)
    }

    pub fn queue_arn(&self, name: &str) -> String {
        format!("arn:aws:sqs:{}:{}:{}", self.region, self.account, name)
    }

    pub fn queue_url(&self, name: &str) -> String {
        format!("https://sqs.{}.amazonaws.com/{}/{}", self.region, self.account, name)
    }

    pub fn topic_arn(&self, name: &str) -> String {
        format!("arn:aws:sns:{}:{}:{}", self.region, self.account, name)
    }

    pub fn function_arn(&self, name: &str) -> String {
        format!("arn:aws:lambda:{}:{}:function:{}", self.region, self.account, name)
    }

    pub async fn put_parameter(&self, name: &str, value: &str) {
        let mut state = self.state.lock().await;
        state.parameters.insert(name.to_string(), value.to_string());
    }

    /// Make every subsequent call of `op` fail until cleared
    pub async fn fail_on(&self, op: &str) {
        self.state.lock().await.fail_points.insert(op.to_string());
    }

    pub async fn clear_failure(&self, op: &str) {
        self.state.lock().await.fail_points.remove(op);
    }

    pub async fn table_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.tables.values().map(|t| t.spec.name.clone()).collect();
        names.sort();
        names
    }

    pub async fn table_spec(&self, table_arn: &str) -> Option<TableSpec> {
        let state = self.state.lock().await;
        state.tables.get(table_arn).map(|t| t.spec.clone())
    }

    pub async fn queue_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.queues.values().map(|q| q.name.clone()).collect();
        names.sort();
        names
    }

    pub async fn queue_depth(&self, queue_url: &str) -> usize {
        let state = self.state.lock().await;
        state.queues.get(queue_url).map(|q| q.messages.len()).unwrap_or(0)
    }

    pub async fn topic_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.topics.values().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }

    pub async fn subscription_count(&self) -> usize {
        self.state.lock().await.subscriptions.len()
    }

    pub async fn filter_policy(&self, subscription_arn: &str) -> Option<FilterPolicy> {
        let state = self.state.lock().await;
        state.subscriptions.get(subscription_arn).map(|s| s.filter.clone())
    }

    pub async fn mapping_count(&self) -> usize {
        self.state.lock().await.mappings.len()
    }

    pub async fn published_to(&self, topic_arn: &str) -> Vec<PublishedMessage> {
        let state = self.state.lock().await;
        state
            .topics
            .get(topic_arn)
            .map(|t| t.published.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TableService for LocalCloud {
    async fn create_table(&self, spec: &TableSpec) -> CloudResult<TableDescription> {
        let mut state = self.state.lock().await;
        state.check(ops::CREATE_TABLE)?;

        let arn = self.table_arn(&spec.name);
        if state.tables.contains_key(&arn) {
            return Err(CloudError::AlreadyExists { kind: "table", name: spec.name.clone() });
        }

        state.tables.insert(
            arn.clone(),
            LocalTable { spec: spec.clone(), items: BTreeMap::new() },
        );
        Ok(TableDescription { name: spec.name.clone(), arn })
    }

    async fn delete_table(&self, table_arn: &str) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.check(ops::DELETE_TABLE)?;

        state
            .tables
            .remove(table_arn)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound { kind: "table", name: table_arn.to_string() })
    }

    async fn put_item(&self, table_arn: &str, record: &MessageRecord) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.check(ops::PUT_ITEM)?;

        let table = state
            .tables
            .get_mut(table_arn)
            .ok_or_else(|| CloudError::NotFound { kind: "table", name: table_arn.to_string() })?;
        table.items.insert((record.account, record.timestamp), record.clone());
        Ok(())
    }

    async fn get_item(
        &self,
        table_arn: &str,
        account: i64,
        timestamp: i64,
    ) -> CloudResult<Option<MessageRecord>> {
        let state = self.state.lock().await;
        let table = state
            .tables
            .get(table_arn)
            .ok_or_else(|| CloudError::NotFound { kind: "table", name: table_arn.to_string() })?;
        Ok(table.items.get(&(account, timestamp)).cloned())
    }
}

#[async_trait]
impl QueueService for LocalCloud {
    async fn create_queue(&self, name: &str, policy: &str) -> CloudResult<String> {
        let mut state = self.state.lock().await;
        state.check(ops::CREATE_QUEUE)?;

        serde_json::from_str::<serde_json::Value>(policy)
            .map_err(|e| CloudError::Invalid(format!("queue policy is not valid JSON: {}", e)))?;

        let url = self.queue_url(name);
        if state.queues.contains_key(&url) {
            return Err(CloudError::AlreadyExists { kind: "queue", name: name.to_string() });
        }

        state.queues.insert(
            url.clone(),
            LocalQueue {
                name: name.to_string(),
                arn: self.queue_arn(name),
                messages: VecDeque::new(),
            },
        );
        Ok(url)
    }

    async fn get_queue_arn(&self, queue_url: &str) -> CloudResult<String> {
        let state = self.state.lock().await;
        state.check(ops::GET_QUEUE_ARN)?;

        state
            .queues
            .get(queue_url)
            .map(|q| q.arn.clone())
            .ok_or_else(|| CloudError::NotFound { kind: "queue", name: queue_url.to_string() })
    }

    async fn get_queue_url(&self, name: &str) -> CloudResult<String> {
        let state = self.state.lock().await;
        state.check(ops::GET_QUEUE_URL)?;

        let url = self.queue_url(name);
        if state.queues.contains_key(&url) {
            Ok(url)
        } else {
            Err(CloudError::NotFound { kind: "queue", name: name.to_string() })
        }
    }

    async fn delete_queue(&self, queue_url: &str) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.check(ops::DELETE_QUEUE)?;

        state
            .queues
            .remove(queue_url)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound { kind: "queue", name: queue_url.to_string() })
    }

    async fn receive_messages(&self, queue_url: &str, max: usize) -> CloudResult<Vec<QueueMessage>> {
        let mut state = self.state.lock().await;
        let queue = state
            .queues
            .get_mut(queue_url)
            .ok_or_else(|| CloudError::NotFound { kind: "queue", name: queue_url.to_string() })?;

        let count = max.min(queue.messages.len());
        Ok(queue.messages.drain(..count).collect())
    }
}

#[async_trait]
impl TopicService for LocalCloud {
    async fn create_topic(&self, name: &str) -> CloudResult<String> {
        let mut state = self.state.lock().await;
        state.check(ops::CREATE_TOPIC)?;

        let arn = self.topic_arn(name);
        if state.topics.contains_key(&arn) {
            return Err(CloudError::AlreadyExists { kind: "topic", name: name.to_string() });
        }

        state.topics.insert(
            arn.clone(),
            LocalTopic {
                name: name.to_string(),
                published: Vec::new(),
            },
        );
        Ok(arn)
    }

    async fn delete_topic(&self, topic_arn: &str) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.check(ops::DELETE_TOPIC)?;

        state
            .topics
            .remove(topic_arn)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound { kind: "topic", name: topic_arn.to_string() })
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        queue_arn: &str,
        filter: &FilterPolicy,
    ) -> CloudResult<String> {
        let mut state = self.state.lock().await;
        state.check(ops::SUBSCRIBE)?;

        if !state.topics.contains_key(topic_arn) {
            return Err(CloudError::NotFound { kind: "topic", name: topic_arn.to_string() });
        }

        let arn = format!("{}:{}", topic_arn, Uuid::new_v4());
        state.subscriptions.insert(
            arn.clone(),
            LocalSubscription {
                topic_arn: topic_arn.to_string(),
                endpoint: queue_arn.to_string(),
                filter: filter.clone(),
            },
        );
        Ok(arn)
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.check(ops::UNSUBSCRIBE)?;

        state
            .subscriptions
            .remove(subscription_arn)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound {
                kind: "subscription",
                name: subscription_arn.to_string(),
            })
    }

    async fn set_filter_policy(&self, subscription_arn: &str, filter: &FilterPolicy) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.check(ops::SET_FILTER_POLICY)?;

        let subscription = state.subscriptions.get_mut(subscription_arn).ok_or_else(|| {
            CloudError::NotFound { kind: "subscription", name: subscription_arn.to_string() }
        })?;
        subscription.filter = filter.clone();
        Ok(())
    }

    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        attributes: &MessageAttributes,
    ) -> CloudResult<String> {
        let mut state = self.state.lock().await;
        state.check(ops::PUBLISH)?;

        let message_id = Uuid::new_v4().to_string();
        let topic = state
            .topics
            .get_mut(topic_arn)
            .ok_or_else(|| CloudError::NotFound { kind: "topic", name: topic_arn.to_string() })?;
        topic.published.push(PublishedMessage {
            message_id: message_id.clone(),
            message: message.to_string(),
            attributes: attributes.clone(),
        });

        let envelope = Envelope {
            message_id: message_id.clone(),
            topic_arn: topic_arn.to_string(),
            message: message.to_string(),
            message_attributes: attributes.clone(),
        };
        let body = serde_json::to_string(&envelope)
            .map_err(|e| CloudError::Invalid(format!("failed to encode envelope: {}", e)))?;

        let endpoints: Vec<String> = state
            .subscriptions
            .values()
            .filter(|s| s.topic_arn == topic_arn && s.filter.matches(attributes))
            .map(|s| s.endpoint.clone())
            .collect();

        // Deliveries to queues that no longer exist are dropped
        for endpoint in endpoints {
            if let Some(queue) = state.queues.values_mut().find(|q| q.arn == endpoint) {
                queue.messages.push_back(QueueMessage {
                    message_id: message_id.clone(),
                    body: body.clone(),
                });
            }
        }

        Ok(message_id)
    }
}

#[async_trait]
impl ParameterStore for LocalCloud {
    async fn get_parameter(&self, name: &str) -> CloudResult<String> {
        let state = self.state.lock().await;
        state.check(ops::GET_PARAMETER)?;

        state
            .parameters
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::NotFound { kind: "parameter", name: name.to_string() })
    }
}

#[async_trait]
impl EventBindingService for LocalCloud {
    async fn create_event_source_mapping(&self, source_arn: &str, function: &str) -> CloudResult<String> {
        let mut state = self.state.lock().await;
        state.check(ops::CREATE_EVENT_SOURCE_MAPPING)?;

        if !state.queues.values().any(|q| q.arn == source_arn) {
            return Err(CloudError::NotFound { kind: "queue", name: source_arn.to_string() });
        }

        let uuid = Uuid::new_v4().to_string();
        state.mappings.insert(
            uuid.clone(),
            EventSourceMapping {
                uuid: uuid.clone(),
                event_source_arn: source_arn.to_string(),
                function: function.to_string(),
            },
        );
        Ok(uuid)
    }

    async fn list_event_source_mappings(&self, function: &str) -> CloudResult<Vec<EventSourceMapping>> {
        let state = self.state.lock().await;
        let mut mappings: Vec<EventSourceMapping> = state
            .mappings
            .values()
            .filter(|m| m.function == function)
            .cloned()
            .collect();
        mappings.sort_by(|a, b| a.event_source_arn.cmp(&b.event_source_arn));
        Ok(mappings)
    }

    async fn delete_event_source_mapping(&self, uuid: &str) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.check(ops::DELETE_EVENT_SOURCE_MAPPING)?;

        state
            .mappings
            .remove(uuid)
            .map(|_| ())
            .ok_or_else(|| CloudError::NotFound { kind: "event source mapping", name: uuid.to_string() })
    }
}
