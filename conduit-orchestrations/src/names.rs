//! Name constants for Conduit orchestrations
//!
//! Naming convention: {crate-name}::{type}::{name}

/// Orchestration names
pub mod orchestrations {
    /// Provision a channel
    ///
    /// **Input:** [`crate::types::CreateChannelInput`]
    /// **Output:** [`crate::types::CreateChannelOutput`]
    /// **Activities used:**
    /// - [`crate::activity_names::activities::registry::CHECK_ALIAS_AVAILABLE`]
    /// - [`crate::activity_names::activities::CREATE_TABLE`]
    /// - [`crate::activity_names::activities::CREATE_QUEUE`]
    /// - [`crate::activity_names::activities::GET_QUEUE_ARN`]
    /// - [`crate::activity_names::activities::CREATE_ENDPOINT_TOPIC`]
    /// - [`crate::activity_names::activities::RESOLVE_WORKER`]
    /// - [`crate::activity_names::activities::SUBSCRIBE_QUEUE`]
    /// - [`crate::activity_names::activities::BIND_EVENT_SOURCE`]
    /// - [`crate::activity_names::activities::registry::REGISTER_CHANNEL`]
    /// **Failure:** compensations run in reverse order
    pub const CREATE_CHANNEL: &str = "conduit-orchestrations::orchestration::create-channel";

    /// Tear down every resource of a channel, then its registry row
    ///
    /// **Input:** [`crate::types::DeleteChannelInput`]
    /// **Output:** [`crate::types::DeleteChannelOutput`]
    /// **Failure:** fatal, no rollback
    pub const DELETE_CHANNEL: &str = "conduit-orchestrations::orchestration::delete-channel";

    /// Rename a channel and move its routing filter to the new alias
    ///
    /// **Input:** [`crate::types::UpdateChannelInput`]
    /// **Output:** [`crate::types::UpdateChannelOutput`]
    pub const UPDATE_CHANNEL: &str = "conduit-orchestrations::orchestration::update-channel";
}
