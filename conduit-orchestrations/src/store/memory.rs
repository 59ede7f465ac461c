use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use conduit_models::Channel;
use tokio::sync::RwLock;

use super::{ChannelRegistry, RegistryResult};
use crate::error::RegistryError;

#[derive(Debug, Default)]
struct Rows {
    channels: BTreeMap<i64, Channel>,
    high_water: i64,
}

/// Registry held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    rows: Arc<RwLock<Rows>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelRegistry for MemoryRegistry {
    async fn next_id(&self) -> RegistryResult<i64> {
        let mut rows = self.rows.write().await;
        let count = rows.channels.len() as i64;
        let id = count.max(rows.high_water) + 1;
        rows.high_water = id;
        Ok(id)
    }

    async fn insert(&self, channel: &Channel) -> RegistryResult<()> {
        let mut rows = self.rows.write().await;
        if rows.channels.contains_key(&channel.id) {
            return Err(RegistryError::DuplicateId(channel.id));
        }
        rows.high_water = rows.high_water.max(channel.id);
        rows.channels.insert(channel.id, channel.clone());
        Ok(())
    }

    async fn get(&self, id: i64) -> RegistryResult<Option<Channel>> {
        Ok(self.rows.read().await.channels.get(&id).cloned())
    }

    async fn find_by_alias(&self, alias: &str) -> RegistryResult<Vec<Channel>> {
        let rows = self.rows.read().await;
        Ok(rows
            .channels
            .values()
            .filter(|c| c.alias == alias)
            .cloned()
            .collect())
    }

    async fn update_alias(&self, id: i64, alias: &str) -> RegistryResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.channels.get_mut(&id) {
            Some(channel) => {
                channel.alias = alias.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_subscription(&self, id: i64, subscription_arn: &str) -> RegistryResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.channels.get_mut(&id) {
            Some(channel) => {
                channel.subscription_arn = subscription_arn.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: i64) -> RegistryResult<bool> {
        Ok(self.rows.write().await.channels.remove(&id).is_some())
    }

    async fn list(&self) -> RegistryResult<Vec<Channel>> {
        Ok(self.rows.read().await.channels.values().cloned().collect())
    }

    async fn count(&self) -> RegistryResult<i64> {
        Ok(self.rows.read().await.channels.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: i64, alias: &str) -> Channel {
        Channel {
            id,
            alias: alias.to_string(),
            table_arn: format!("table-{}", id),
            queue_arn: format!("queue-{}", id),
            endpoint_topic_arn: format!("topic-{}", id),
            subscription_arn: format!("sub-{}", id),
        }
    }

    #[tokio::test]
    async fn test_next_id_starts_at_one() {
        let registry = MemoryRegistry::new();
        assert_eq!(registry.next_id().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_remove() {
        let registry = MemoryRegistry::new();
        for alias in ["a", "b", "c"] {
            let id = registry.next_id().await.unwrap();
            registry.insert(&channel(id, alias)).await.unwrap();
        }
        assert!(registry.remove(3).await.unwrap());
        assert_eq!(registry.next_id().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let registry = MemoryRegistry::new();
        registry.insert(&channel(1, "a")).await.unwrap();
        let err = registry.insert(&channel(1, "b")).await.unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(1)));
    }

    #[tokio::test]
    async fn test_alias_lookup_is_non_unique() {
        let registry = MemoryRegistry::new();
        registry.insert(&channel(1, "dup")).await.unwrap();
        registry.insert(&channel(2, "dup")).await.unwrap();
        registry.insert(&channel(3, "other")).await.unwrap();
        assert_eq!(registry.find_by_alias("dup").await.unwrap().len(), 2);

        assert!(registry.update_alias(2, "renamed").await.unwrap());
        assert_eq!(registry.find_by_alias("dup").await.unwrap().len(), 1);
        assert!(!registry.update_alias(9, "nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_subscription() {
        let registry = MemoryRegistry::new();
        registry.insert(&channel(1, "a")).await.unwrap();

        assert!(registry.update_subscription(1, "sub-new").await.unwrap());
        let row = registry.get(1).await.unwrap().unwrap();
        assert_eq!(row.subscription_arn, "sub-new");
        assert_eq!(row.alias, "a");
        assert!(!registry.update_subscription(2, "sub-x").await.unwrap());
    }
}
