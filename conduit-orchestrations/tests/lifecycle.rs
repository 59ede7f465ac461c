//! Channel lifecycle through the workflow runtime, against the local cloud
//! and an in-memory registry

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_models::{ChannelRequest, MessageRecord, PublishMessageRequest};
use conduit_orchestrations::cloud::{
    ops, CloudResult, LocalCloud, TableDescription, TableService, TableSpec,
};
use conduit_orchestrations::messaging::{MessagePublisher, MessageRelay};
use conduit_orchestrations::naming::resource_name;
use conduit_orchestrations::store::MemoryRegistry;
use conduit_orchestrations::topology::{ChannelServices, SharedTopology, FAN_OUT_TOPIC_NAME};
use conduit_orchestrations::{ChannelKey, ChannelOrchestrator, ErrorKind, CHANGE_CHANNEL_NAME};
use duroxide::providers::sqlite::SqliteProvider;

async fn start(services: ChannelServices) -> ChannelOrchestrator {
    let store = Arc::new(SqliteProvider::new_in_memory().await.unwrap());
    ChannelOrchestrator::start(store, Arc::new(services))
        .await
        .with_wait(Duration::from_secs(30))
}

async fn local_topology(cloud: &LocalCloud) -> SharedTopology {
    cloud.bootstrap_shared().await.unwrap();
    SharedTopology::resolve(None, None, cloud).await.unwrap()
}

async fn setup() -> (ChannelOrchestrator, LocalCloud) {
    let cloud = LocalCloud::default();
    let topology = local_topology(&cloud).await;
    let services = ChannelServices::local(cloud.clone(), Arc::new(MemoryRegistry::new()), topology);
    (start(services).await, cloud)
}

/// Table service whose creates finish only after a delay
struct SlowTables {
    inner: LocalCloud,
    delay: Duration,
}

#[async_trait]
impl TableService for SlowTables {
    async fn create_table(&self, spec: &TableSpec) -> CloudResult<TableDescription> {
        tokio::time::sleep(self.delay).await;
        self.inner.create_table(spec).await
    }

    async fn delete_table(&self, table_arn: &str) -> CloudResult<()> {
        self.inner.delete_table(table_arn).await
    }

    async fn put_item(&self, table_arn: &str, record: &MessageRecord) -> CloudResult<()> {
        self.inner.put_item(table_arn, record).await
    }

    async fn get_item(
        &self,
        table_arn: &str,
        account: i64,
        timestamp: i64,
    ) -> CloudResult<Option<MessageRecord>> {
        self.inner.get_item(table_arn, account, timestamp).await
    }
}

fn rename_to(name: &str) -> ChannelRequest {
    let mut params = BTreeMap::new();
    params.insert("name".to_string(), name.to_string());
    ChannelRequest {
        action: CHANGE_CHANNEL_NAME.to_string(),
        parameters: vec![params],
    }
}

fn publisher(orchestrator: &ChannelOrchestrator) -> MessagePublisher {
    let services = orchestrator.services();
    MessagePublisher::new(
        services.topics.clone(),
        services.topology.fan_out_topic_arn.clone(),
    )
}

fn message(channel: &str, account: i64, timestamp: i64, content: &str) -> PublishMessageRequest {
    PublishMessageRequest {
        message: content.to_string(),
        channel: channel.to_string(),
        account: account.to_string(),
        timestamp: timestamp.to_string(),
    }
}

/// Only the shared fan-out topic and nothing else
async fn assert_no_channel_resources(cloud: &LocalCloud) {
    assert!(cloud.table_names().await.is_empty());
    assert!(cloud.queue_names().await.is_empty());
    assert_eq!(cloud.topic_names().await, vec![FAN_OUT_TOPIC_NAME.to_string()]);
    assert_eq!(cloud.subscription_count().await, 0);
    assert_eq!(cloud.mapping_count().await, 0);
}

#[tokio::test]
async fn test_ids_start_at_one_and_increase() {
    let (orchestrator, _cloud) = setup().await;

    let mut ids = Vec::new();
    for alias in ["alpha", "beta", "gamma"] {
        let channel = orchestrator.create_channel(alias).await.unwrap();
        assert_eq!(channel.alias, alias);
        assert!(channel.has_complete_refs());
        ids.push(channel.id);
    }

    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(orchestrator.list_channels().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_created_resources_follow_naming_convention() {
    let (orchestrator, cloud) = setup().await;
    let channel = orchestrator.create_channel("sports").await.unwrap();

    assert_eq!(cloud.table_names().await, vec!["sportsTable".to_string()]);
    assert_eq!(cloud.queue_names().await, vec!["sportsChannelQueue".to_string()]);
    assert!(cloud.topic_names().await.contains(&"sportsEndpointTopic".to_string()));
    assert_eq!(resource_name(&channel.queue_arn), "sportsChannelQueue");

    let spec = cloud.table_spec(&channel.table_arn).await.unwrap();
    assert_eq!(spec.partition_key.name, "account");
    assert_eq!(spec.sort_key.name, "timestamp");
    assert_eq!(spec.secondary_indexes[0].name, "AccountContent");

    let filter = cloud.filter_policy(&channel.subscription_arn).await.unwrap();
    assert_eq!(filter.to_json(), r#"{"channel":["sports"]}"#);
    assert_eq!(cloud.mapping_count().await, 1);
}

#[tokio::test]
async fn test_failed_create_leaves_no_row_and_compensates() {
    let (orchestrator, cloud) = setup().await;
    cloud.fail_on(ops::SUBSCRIBE).await;

    let err = orchestrator.create_channel("news").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);

    assert!(orchestrator.list_channels().await.unwrap().is_empty());
    assert_no_channel_resources(&cloud).await;
}

#[tokio::test]
async fn test_failed_binding_compensates_subscription() {
    let (orchestrator, cloud) = setup().await;
    cloud.fail_on(ops::CREATE_EVENT_SOURCE_MAPPING).await;

    let err = orchestrator.create_channel("news").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);

    assert!(orchestrator.list_channels().await.unwrap().is_empty());
    assert_no_channel_resources(&cloud).await;
}

#[tokio::test]
async fn test_slow_sibling_is_compensated_after_fast_failure() {
    let cloud = LocalCloud::default();
    let topology = local_topology(&cloud).await;
    let mut services =
        ChannelServices::local(cloud.clone(), Arc::new(MemoryRegistry::new()), topology);
    services.tables = Arc::new(SlowTables {
        inner: cloud.clone(),
        delay: Duration::from_millis(200),
    });
    let orchestrator = start(services).await;

    // The topic fails at once while the table is still being created
    cloud.fail_on(ops::CREATE_TOPIC).await;
    let err = orchestrator.create_channel("sports").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);

    assert!(orchestrator.list_channels().await.unwrap().is_empty());
    assert_no_channel_resources(&cloud).await;

    cloud.clear_failure(ops::CREATE_TOPIC).await;
    let channel = orchestrator.create_channel("sports").await.unwrap();
    assert_eq!(channel.id, 1);
    assert_eq!(cloud.table_names().await, vec!["sportsTable".to_string()]);
}

#[tokio::test]
async fn test_recreating_renamed_alias_keeps_live_resources() {
    let (orchestrator, cloud) = setup().await;
    let channel = orchestrator.create_channel("foo").await.unwrap();
    orchestrator
        .update_channel(ChannelKey::Id(channel.id), &rename_to("bar"))
        .await
        .unwrap();

    // "foo" is free in the registry but its resource names are still in use
    let err = orchestrator.create_channel("foo").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let rows = orchestrator.list_channels().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].alias, "bar");

    assert_eq!(cloud.table_names().await, vec!["fooTable".to_string()]);
    assert_eq!(cloud.queue_names().await, vec!["fooChannelQueue".to_string()]);
    assert!(cloud.topic_names().await.contains(&"fooEndpointTopic".to_string()));
    assert_eq!(cloud.subscription_count().await, 1);
    assert_eq!(cloud.mapping_count().await, 1);

    let queue_url = cloud.queue_url(resource_name(&channel.queue_arn));
    publisher(&orchestrator)
        .publish(&message("bar", 1, 10, "still routed"))
        .await
        .unwrap();
    assert_eq!(cloud.queue_depth(&queue_url).await, 1);
}

#[tokio::test]
async fn test_retry_after_fix_yields_single_row() {
    let (orchestrator, cloud) = setup().await;
    cloud.fail_on(ops::CREATE_QUEUE).await;
    assert!(orchestrator.create_channel("news").await.is_err());

    cloud.clear_failure(ops::CREATE_QUEUE).await;
    let channel = orchestrator.create_channel("news").await.unwrap();
    assert_eq!(channel.id, 1);

    let rows = orchestrator.list_channels().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].alias, "news");
}

#[tokio::test]
async fn test_duplicate_alias_is_conflict() {
    let (orchestrator, cloud) = setup().await;
    orchestrator.create_channel("sports").await.unwrap();

    let err = orchestrator.create_channel("sports").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(orchestrator.list_channels().await.unwrap().len(), 1);
    assert_eq!(cloud.table_names().await.len(), 1);
}

#[tokio::test]
async fn test_invalid_alias_rejected_before_any_resource() {
    let (orchestrator, cloud) = setup().await;

    let err = orchestrator.create_channel("bad name!").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_no_channel_resources(&cloud).await;
}

#[tokio::test]
async fn test_delete_is_inverse_of_create() {
    let (orchestrator, cloud) = setup().await;
    let created = orchestrator.create_channel("sports").await.unwrap();

    let deleted = orchestrator
        .delete_channel(ChannelKey::Alias("sports".to_string()))
        .await
        .unwrap();
    assert_eq!(deleted, created);

    assert!(orchestrator.list_channels().await.unwrap().is_empty());
    assert_no_channel_resources(&cloud).await;

    let err = orchestrator
        .delete_channel(ChannelKey::Alias("sports".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_by_id_and_ids_not_reused() {
    let (orchestrator, _cloud) = setup().await;
    orchestrator.create_channel("a").await.unwrap();
    let b = orchestrator.create_channel("b").await.unwrap();

    orchestrator.delete_channel(ChannelKey::Id(b.id)).await.unwrap();
    let c = orchestrator.create_channel("c").await.unwrap();
    assert_eq!(c.id, 3);
}

#[tokio::test]
async fn test_delete_retry_after_partial_failure() {
    let (orchestrator, cloud) = setup().await;
    orchestrator.create_channel("news").await.unwrap();

    cloud.fail_on(ops::DELETE_TOPIC).await;
    let err = orchestrator.delete_channel(ChannelKey::Id(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    // Registry row survives for the retry
    assert_eq!(orchestrator.list_channels().await.unwrap().len(), 1);

    cloud.clear_failure(ops::DELETE_TOPIC).await;
    orchestrator.delete_channel(ChannelKey::Id(1)).await.unwrap();
    assert!(orchestrator.list_channels().await.unwrap().is_empty());
    assert_no_channel_resources(&cloud).await;
}

#[tokio::test]
async fn test_delete_ambiguous_alias_is_conflict() {
    let (orchestrator, _cloud) = setup().await;
    let first = orchestrator.create_channel("one").await.unwrap();
    let mut twin = orchestrator.create_channel("two").await.unwrap();

    // Rows written outside the orchestrator may share an alias
    twin.id = 99;
    twin.alias = first.alias.clone();
    orchestrator.services().registry.insert(&twin).await.unwrap();

    let err = orchestrator
        .delete_channel(ChannelKey::Alias("one".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(orchestrator.list_channels().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_rename_moves_routing_to_new_alias() {
    let (orchestrator, cloud) = setup().await;
    let channel = orchestrator.create_channel("foo").await.unwrap();
    let queue_url = cloud.queue_url(resource_name(&channel.queue_arn));

    let updated = orchestrator
        .update_channel(ChannelKey::Alias("foo".to_string()), &rename_to("bar"))
        .await
        .unwrap();
    assert!(updated.applied);
    let renamed = updated.channel.unwrap();
    assert_eq!(renamed.alias, "bar");
    assert_eq!(renamed.id, channel.id);

    let rows = orchestrator.list_channels().await.unwrap();
    assert_eq!(rows[0].alias, "bar");

    let publisher = publisher(&orchestrator);
    publisher.publish(&message("bar", 1, 10, "to bar")).await.unwrap();
    assert_eq!(cloud.queue_depth(&queue_url).await, 1);

    publisher.publish(&message("foo", 1, 11, "to foo")).await.unwrap();
    assert_eq!(cloud.queue_depth(&queue_url).await, 1);

    // Physical table keeps the original name
    assert_eq!(cloud.table_names().await, vec!["fooTable".to_string()]);
}

#[tokio::test]
async fn test_rename_reverts_alias_when_filter_update_fails() {
    let (orchestrator, cloud) = setup().await;
    let channel = orchestrator.create_channel("foo").await.unwrap();
    cloud.fail_on(ops::SET_FILTER_POLICY).await;

    let err = orchestrator
        .update_channel(ChannelKey::Id(channel.id), &rename_to("bar"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);

    let rows = orchestrator.list_channels().await.unwrap();
    assert_eq!(rows[0].alias, "foo");
    let filter = cloud.filter_policy(&channel.subscription_arn).await.unwrap();
    assert_eq!(filter.to_json(), r#"{"channel":["foo"]}"#);
}

#[tokio::test]
async fn test_rename_to_taken_alias_is_conflict() {
    let (orchestrator, _cloud) = setup().await;
    orchestrator.create_channel("foo").await.unwrap();
    orchestrator.create_channel("bar").await.unwrap();

    let err = orchestrator
        .update_channel(ChannelKey::Alias("foo".to_string()), &rename_to("bar"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_rename_parameter_validation() {
    let (orchestrator, _cloud) = setup().await;
    orchestrator.create_channel("foo").await.unwrap();

    let no_params = ChannelRequest {
        action: CHANGE_CHANNEL_NAME.to_string(),
        parameters: vec![],
    };
    let err = orchestrator
        .update_channel(ChannelKey::Id(1), &no_params)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mut wrong_key = BTreeMap::new();
    wrong_key.insert("title".to_string(), "bar".to_string());
    let missing_name = ChannelRequest {
        action: CHANGE_CHANNEL_NAME.to_string(),
        parameters: vec![wrong_key],
    };
    let err = orchestrator
        .update_channel(ChannelKey::Id(1), &missing_name)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(orchestrator.list_channels().await.unwrap()[0].alias, "foo");
}

#[tokio::test]
async fn test_unknown_action_is_ignored() {
    let (orchestrator, _cloud) = setup().await;
    orchestrator.create_channel("foo").await.unwrap();

    let request = ChannelRequest {
        action: "ArchiveChannel".to_string(),
        parameters: vec![],
    };
    let output = orchestrator
        .update_channel(ChannelKey::Id(1), &request)
        .await
        .unwrap();
    assert!(!output.applied);
    assert_eq!(orchestrator.list_channels().await.unwrap()[0].alias, "foo");
}

#[tokio::test]
async fn test_unknown_action_on_missing_channel_is_ignored() {
    let (orchestrator, _cloud) = setup().await;

    let request = ChannelRequest {
        action: "ArchiveChannel".to_string(),
        parameters: vec![],
    };
    let output = orchestrator
        .update_channel(ChannelKey::Alias("ghost".to_string()), &request)
        .await
        .unwrap();
    assert!(!output.applied);
    assert_eq!(output.channel, None);
}

#[tokio::test]
async fn test_rename_missing_channel_is_not_found() {
    let (orchestrator, _cloud) = setup().await;

    let err = orchestrator
        .update_channel(ChannelKey::Alias("ghost".to_string()), &rename_to("bar"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_sports_end_to_end() {
    let (orchestrator, cloud) = setup().await;

    let channel = orchestrator.create_channel("sports").await.unwrap();
    assert_eq!(channel.id, 1);
    assert_eq!(channel.alias, "sports");
    assert!(channel.has_complete_refs());

    publisher(&orchestrator)
        .publish(&message("sports", 42, 1_700_000_000, "goal!"))
        .await
        .unwrap();

    let relay = MessageRelay::new(orchestrator.services().clone());
    let report = relay.poll_bound_queues(10).await.unwrap();
    assert_eq!(report.relayed, 1);
    assert_eq!(report.failed, 0);

    let stored = cloud
        .get_item(&channel.table_arn, 42, 1_700_000_000)
        .await
        .unwrap();
    assert_eq!(
        stored,
        Some(MessageRecord {
            channel: "sports".to_string(),
            account: 42,
            timestamp: 1_700_000_000,
            content: "goal!".to_string(),
        })
    );

    let republished = cloud.published_to(&channel.endpoint_topic_arn).await;
    assert_eq!(republished.len(), 1);
    assert_eq!(republished[0].message, "goal!");
    assert_eq!(republished[0].attributes["account"].value, "42");

    orchestrator
        .delete_channel(ChannelKey::Alias("sports".to_string()))
        .await
        .unwrap();
    let remaining = orchestrator
        .services()
        .registry
        .find_by_alias("sports")
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
