//! The channel registry: one authoritative row per channel
//!
//! Rows are keyed by the immutable channel id. The alias is a secondary,
//! non-unique lookup path served by an equality scan.

use async_trait::async_trait;
use conduit_models::Channel;

use crate::error::RegistryError;

mod memory;
mod postgres;

pub use memory::MemoryRegistry;
pub use postgres::PgRegistry;

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    /// Allocate the id for a new channel.
    ///
    /// Returns `max(entry count, highest id ever assigned) + 1`, so an empty
    /// registry yields 1 and ids are never handed out twice.
    async fn next_id(&self) -> RegistryResult<i64>;

    /// Insert a fully provisioned channel. Fails on a duplicate id.
    async fn insert(&self, channel: &Channel) -> RegistryResult<()>;

    async fn get(&self, id: i64) -> RegistryResult<Option<Channel>>;

    async fn find_by_alias(&self, alias: &str) -> RegistryResult<Vec<Channel>>;

    /// Returns false when no row has this id
    async fn update_alias(&self, id: i64, alias: &str) -> RegistryResult<bool>;

    /// Point a row at a replacement subscription. Returns false when no row has this id
    async fn update_subscription(&self, id: i64, subscription_arn: &str) -> RegistryResult<bool>;

    /// Returns false when no row has this id
    async fn remove(&self, id: i64) -> RegistryResult<bool>;

    async fn list(&self) -> RegistryResult<Vec<Channel>>;

    async fn count(&self) -> RegistryResult<i64>;
}
