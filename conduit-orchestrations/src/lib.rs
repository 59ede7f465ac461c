//! Conduit Orchestrations - lifecycle workflows and activities for channels
//!
//! A channel is a pub/sub pipeline made of a message table, a queue
//! subscribed to the shared fan-out topic, an outbound endpoint topic and
//! an event binding to the shared message worker. This crate provisions,
//! deprovisions and renames channels while keeping the registry in step
//! with the resources that actually exist.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use conduit_orchestrations::cloud::LocalCloud;
//! use conduit_orchestrations::store::MemoryRegistry;
//! use conduit_orchestrations::topology::{ChannelServices, SharedTopology};
//! use conduit_orchestrations::ChannelOrchestrator;
//! use duroxide::providers::sqlite::SqliteProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cloud = LocalCloud::default();
//! cloud.bootstrap_shared().await?;
//! let topology = SharedTopology::resolve(None, None, &cloud).await?;
//! let services = ChannelServices::local(cloud, Arc::new(MemoryRegistry::new()), topology);
//!
//! let store = Arc::new(SqliteProvider::new_in_memory().await?);
//! let orchestrator = ChannelOrchestrator::start(store, Arc::new(services)).await;
//! let channel = orchestrator.create_channel("sports").await?;
//! assert_eq!(channel.id, 1);
//! orchestrator.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cloud;
pub mod error;
pub mod messaging;
pub mod naming;
pub mod registry;
pub mod restore;
pub mod store;
pub mod topology;

// Orchestration exports
pub mod names;
pub mod types;

// Activity exports
pub mod activity_names;
pub mod activity_types;

mod activities;
mod orchestrations;
mod orchestrator;
mod saga;

#[cfg(test)]
mod test_support;

pub use error::{ChannelError, ErrorKind, Result};
pub use orchestrator::ChannelOrchestrator;
pub use types::*;
