//! Registry builders for Conduit orchestrations and activities

use std::future::Future;
use std::sync::Arc;

use duroxide::runtime::registry::ActivityRegistry;
use duroxide::{ActivityContext, OrchestrationRegistry};

use crate::activities;
use crate::activity_names::activities as names;
use crate::names::orchestrations;
use crate::topology::ChannelServices;

/// Create an OrchestrationRegistry with all Conduit orchestrations
///
/// # Example
///
/// ```rust,no_run
/// use conduit_orchestrations::registry::create_orchestration_registry;
///
/// let orchestrations = create_orchestration_registry();
/// ```
pub fn create_orchestration_registry() -> OrchestrationRegistry {
    OrchestrationRegistry::builder()
        .register_typed(
            orchestrations::CREATE_CHANNEL,
            crate::orchestrations::create_channel::create_channel_orchestration,
        )
        .register_typed(
            orchestrations::DELETE_CHANNEL,
            crate::orchestrations::delete_channel::delete_channel_orchestration,
        )
        .register_typed(
            orchestrations::UPDATE_CHANNEL,
            crate::orchestrations::update_channel::update_channel_orchestration,
        )
        .build()
}

/// Bind an activity to the services it runs against
fn with_services<In, Out, F, Fut>(
    services: &Arc<ChannelServices>,
    activity: F,
) -> impl Fn(ActivityContext, In) -> Fut + Send + Sync + 'static
where
    F: Fn(ActivityContext, Arc<ChannelServices>, In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, String>> + Send + 'static,
{
    let services = services.clone();
    move |ctx, input| activity(ctx, services.clone(), input)
}

/// Create an ActivityRegistry with all Conduit activities wired to `services`
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use conduit_orchestrations::cloud::LocalCloud;
/// use conduit_orchestrations::registry::create_activity_registry;
/// use conduit_orchestrations::store::MemoryRegistry;
/// use conduit_orchestrations::topology::{ChannelServices, SharedTopology};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let cloud = LocalCloud::default();
/// cloud.bootstrap_shared().await?;
/// let topology = SharedTopology::resolve(None, None, &cloud).await?;
/// let services = ChannelServices::local(cloud, Arc::new(MemoryRegistry::new()), topology);
///
/// let activities = create_activity_registry(Arc::new(services));
/// # Ok(())
/// # }
/// ```
pub fn create_activity_registry(services: Arc<ChannelServices>) -> ActivityRegistry {
    let s = &services;
    ActivityRegistry::builder()
        // Resource activities
        .register_typed(
            names::CREATE_TABLE,
            with_services(s, activities::create_table::create_table_activity),
        )
        .register_typed(
            names::DELETE_TABLE,
            with_services(s, activities::delete_table::delete_table_activity),
        )
        .register_typed(
            names::CREATE_QUEUE,
            with_services(s, activities::create_queue::create_queue_activity),
        )
        .register_typed(
            names::GET_QUEUE_ARN,
            with_services(s, activities::get_queue_arn::get_queue_arn_activity),
        )
        .register_typed(
            names::GET_QUEUE_URL,
            with_services(s, activities::get_queue_url::get_queue_url_activity),
        )
        .register_typed(
            names::DELETE_QUEUE,
            with_services(s, activities::delete_queue::delete_queue_activity),
        )
        .register_typed(
            names::CREATE_ENDPOINT_TOPIC,
            with_services(s, activities::create_endpoint_topic::create_endpoint_topic_activity),
        )
        .register_typed(
            names::DELETE_ENDPOINT_TOPIC,
            with_services(s, activities::delete_endpoint_topic::delete_endpoint_topic_activity),
        )
        .register_typed(
            names::SUBSCRIBE_QUEUE,
            with_services(s, activities::subscribe_queue::subscribe_queue_activity),
        )
        .register_typed(
            names::UNSUBSCRIBE_QUEUE,
            with_services(s, activities::unsubscribe_queue::unsubscribe_queue_activity),
        )
        .register_typed(
            names::UPDATE_FILTER_POLICY,
            with_services(s, activities::update_filter_policy::update_filter_policy_activity),
        )
        .register_typed(
            names::RESOLVE_WORKER,
            with_services(s, activities::resolve_worker::resolve_worker_activity),
        )
        .register_typed(
            names::BIND_EVENT_SOURCE,
            with_services(s, activities::bind_event_source::bind_event_source_activity),
        )
        .register_typed(
            names::FIND_EVENT_BINDING,
            with_services(s, activities::find_event_binding::find_event_binding_activity),
        )
        .register_typed(
            names::UNBIND_EVENT_SOURCE,
            with_services(s, activities::unbind_event_source::unbind_event_source_activity),
        )
        // Registry activities
        .register_typed(
            names::registry::CHECK_ALIAS_AVAILABLE,
            with_services(s, activities::registry::check_alias_available::check_alias_available_activity),
        )
        .register_typed(
            names::registry::RESOLVE_CHANNEL,
            with_services(s, activities::registry::resolve_channel::resolve_channel_activity),
        )
        .register_typed(
            names::registry::REGISTER_CHANNEL,
            with_services(s, activities::registry::register_channel::register_channel_activity),
        )
        .register_typed(
            names::registry::UPDATE_CHANNEL_ALIAS,
            with_services(s, activities::registry::update_channel_alias::update_channel_alias_activity),
        )
        .register_typed(
            names::registry::DELETE_CHANNEL_RECORD,
            with_services(s, activities::registry::delete_channel_record::delete_channel_record_activity),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::local_services;

    #[test]
    fn test_orchestration_registry_can_be_created() {
        let _registry = create_orchestration_registry();
    }

    #[tokio::test]
    async fn test_activity_registry_can_be_created() {
        let (services, _cloud) = local_services().await;
        let _registry = create_activity_registry(services);
    }
}
