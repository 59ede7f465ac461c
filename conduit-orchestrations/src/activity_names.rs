//! Name constants for Conduit activities
//!
//! Naming convention: {crate-name}::{type}::{name}

/// Activity names
pub mod activities {
    /// Create the per-channel message table
    ///
    /// **Input:** [`crate::activity_types::CreateTableInput`]
    /// **Output:** [`crate::activity_types::CreateTableOutput`]
    /// **Compensation:** [`DELETE_TABLE`]
    pub const CREATE_TABLE: &str = "conduit-orchestrations::activity::create-table";

    /// Delete a channel table by ARN
    pub const DELETE_TABLE: &str = "conduit-orchestrations::activity::delete-table";

    /// Create the channel queue with a policy admitting fan-out deliveries
    ///
    /// **Input:** [`crate::activity_types::CreateQueueInput`]
    /// **Output:** [`crate::activity_types::CreateQueueOutput`]
    /// **Compensation:** [`DELETE_QUEUE`]
    pub const CREATE_QUEUE: &str = "conduit-orchestrations::activity::create-queue";

    /// Read a queue's ARN attribute from its URL
    pub const GET_QUEUE_ARN: &str = "conduit-orchestrations::activity::get-queue-arn";

    /// Rediscover a queue URL from the ARN kept in the registry
    pub const GET_QUEUE_URL: &str = "conduit-orchestrations::activity::get-queue-url";

    pub const DELETE_QUEUE: &str = "conduit-orchestrations::activity::delete-queue";

    /// Create the channel's outbound endpoint topic
    ///
    /// **Input:** [`crate::activity_types::CreateEndpointTopicInput`]
    /// **Output:** [`crate::activity_types::CreateEndpointTopicOutput`]
    /// **Compensation:** [`DELETE_ENDPOINT_TOPIC`]
    pub const CREATE_ENDPOINT_TOPIC: &str = "conduit-orchestrations::activity::create-endpoint-topic";

    pub const DELETE_ENDPOINT_TOPIC: &str = "conduit-orchestrations::activity::delete-endpoint-topic";

    /// Subscribe the channel queue to the fan-out topic, filtered on alias
    ///
    /// **Input:** [`crate::activity_types::SubscribeQueueInput`]
    /// **Output:** [`crate::activity_types::SubscribeQueueOutput`]
    /// **Compensation:** [`UNSUBSCRIBE_QUEUE`]
    pub const SUBSCRIBE_QUEUE: &str = "conduit-orchestrations::activity::subscribe-queue";

    pub const UNSUBSCRIBE_QUEUE: &str = "conduit-orchestrations::activity::unsubscribe-queue";

    /// Point a subscription's filter policy at a new alias
    pub const UPDATE_FILTER_POLICY: &str = "conduit-orchestrations::activity::update-filter-policy";

    /// Read the message worker's identifier from the parameter store
    pub const RESOLVE_WORKER: &str = "conduit-orchestrations::activity::resolve-worker";

    /// Bind the channel queue as an event source of the message worker
    ///
    /// **Input:** [`crate::activity_types::BindEventSourceInput`]
    /// **Output:** [`crate::activity_types::BindEventSourceOutput`]
    /// **Compensation:** [`UNBIND_EVENT_SOURCE`]
    pub const BIND_EVENT_SOURCE: &str = "conduit-orchestrations::activity::bind-event-source";

    /// Find the worker binding whose source is a given queue
    pub const FIND_EVENT_BINDING: &str = "conduit-orchestrations::activity::find-event-binding";

    pub const UNBIND_EVENT_SOURCE: &str = "conduit-orchestrations::activity::unbind-event-source";

    /// Registry activities
    pub mod registry {
        /// Fail with a conflict when another channel already holds an alias
        pub const CHECK_ALIAS_AVAILABLE: &str = "conduit-orchestrations::activity::registry-check-alias-available";

        /// Load a registry row by id or alias
        pub const RESOLVE_CHANNEL: &str = "conduit-orchestrations::activity::registry-resolve-channel";

        /// Allocate the next id and write the registry row
        pub const REGISTER_CHANNEL: &str = "conduit-orchestrations::activity::registry-register-channel";

        pub const UPDATE_CHANNEL_ALIAS: &str = "conduit-orchestrations::activity::registry-update-channel-alias";

        pub const DELETE_CHANNEL_RECORD: &str = "conduit-orchestrations::activity::registry-delete-channel-record";
    }
}
