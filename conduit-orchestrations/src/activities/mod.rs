//! Activities: one remote step each

pub mod bind_event_source;
pub mod create_endpoint_topic;
pub mod create_queue;
pub mod create_table;
pub mod delete_endpoint_topic;
pub mod delete_queue;
pub mod delete_table;
pub mod find_event_binding;
pub mod get_queue_arn;
pub mod get_queue_url;
pub mod resolve_worker;
pub mod subscribe_queue;
pub mod unbind_event_source;
pub mod unsubscribe_queue;
pub mod update_filter_policy;

pub mod registry;
