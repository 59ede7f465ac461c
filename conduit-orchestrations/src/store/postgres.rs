//! PostgreSQL-backed registry

use async_trait::async_trait;
use conduit_models::Channel;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Error as SqlxError, PgPool};

use super::{ChannelRegistry, RegistryResult};
use crate::error::RegistryError;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct PgRegistry {
    pool: PgPool,
}

impl PgRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(db_url: &str) -> RegistryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(db_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the schema, id sequence and channel table if missing
    pub async fn initialize_schema(&self) -> RegistryResult<()> {
        sqlx::query("CREATE SCHEMA IF NOT EXISTS conduit")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE SEQUENCE IF NOT EXISTS conduit.channel_id_seq")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conduit.channels (
                id BIGINT PRIMARY KEY,
                alias TEXT NOT NULL,
                table_arn TEXT NOT NULL,
                queue_arn TEXT NOT NULL,
                endpoint_topic_arn TEXT NOT NULL,
                subscription_arn TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_channels_alias ON conduit.channels (alias)")
            .execute(&self.pool)
            .await?;

        tracing::info!("✓ Registry schema ready");
        Ok(())
    }
}

#[async_trait]
impl ChannelRegistry for PgRegistry {
    async fn next_id(&self) -> RegistryResult<i64> {
        let mut tx = self.pool.begin().await?;

        // Serialise allocations so the count and the sequence move together
        sqlx::query("LOCK TABLE conduit.channels IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let (count, high_water): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM conduit.channels),
                (SELECT CASE WHEN is_called THEN last_value ELSE 0 END FROM conduit.channel_id_seq)
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let id = count.max(high_water) + 1;
        sqlx::query("SELECT setval('conduit.channel_id_seq', $1, true)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn insert(&self, channel: &Channel) -> RegistryResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO conduit.channels
            (id, alias, table_arn, queue_arn, endpoint_topic_arn, subscription_arn)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(channel.id)
        .bind(&channel.alias)
        .bind(&channel.table_arn)
        .bind(&channel.queue_arn)
        .bind(&channel.endpoint_topic_arn)
        .bind(&channel.subscription_arn)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(SqlxError::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(RegistryError::DuplicateId(channel.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: i64) -> RegistryResult<Option<Channel>> {
        let channel = sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, alias, table_arn, queue_arn, endpoint_topic_arn, subscription_arn
            FROM conduit.channels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(channel)
    }

    async fn find_by_alias(&self, alias: &str) -> RegistryResult<Vec<Channel>> {
        let channels = sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, alias, table_arn, queue_arn, endpoint_topic_arn, subscription_arn
            FROM conduit.channels
            WHERE alias = $1
            ORDER BY id
            "#,
        )
        .bind(alias)
        .fetch_all(&self.pool)
        .await?;
        Ok(channels)
    }

    async fn update_alias(&self, id: i64, alias: &str) -> RegistryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE conduit.channels
            SET alias = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(alias)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_subscription(&self, id: i64, subscription_arn: &str) -> RegistryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE conduit.channels
            SET subscription_arn = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(subscription_arn)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: i64) -> RegistryResult<bool> {
        let result = sqlx::query("DELETE FROM conduit.channels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> RegistryResult<Vec<Channel>> {
        let channels = sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, alias, table_arn, queue_arn, endpoint_topic_arn, subscription_arn
            FROM conduit.channels
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(channels)
    }

    async fn count(&self) -> RegistryResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conduit.channels")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
