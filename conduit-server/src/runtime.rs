use std::sync::Arc;

use anyhow::{Context, Result};
use conduit_orchestrations::cloud::LocalCloud;
use conduit_orchestrations::restore::restore_channels;
use conduit_orchestrations::store::{ChannelRegistry, MemoryRegistry, PgRegistry};
use conduit_orchestrations::topology::{ChannelServices, SharedTopology};
use conduit_orchestrations::ChannelOrchestrator;
use duroxide::providers::sqlite::SqliteProvider;
use duroxide_pg::PostgresProvider;

use crate::config::Config;

/// Schema holding workflow history next to the registry
const WORKFLOW_SCHEMA: &str = "conduit_duroxide";

/// Wire the cloud services, registry, shared topology and workflow runtime
pub async fn initialize(config: &Config) -> Result<ChannelOrchestrator> {
    let cloud = LocalCloud::new(&config.region, &config.account_id);
    let fan_out = cloud
        .bootstrap_shared()
        .await
        .context("Failed to bootstrap shared resources")?;
    tracing::info!("✓ Local cloud ready ({}, fan-out: {})", config.region, fan_out);

    let registry: Arc<dyn ChannelRegistry> = match &config.database_url {
        Some(db_url) => {
            tracing::info!("Connecting to PostgreSQL registry");
            let registry = PgRegistry::connect(db_url)
                .await
                .context("Failed to connect to registry database")?;
            registry
                .initialize_schema()
                .await
                .context("Failed to initialize registry schema")?;
            Arc::new(registry)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, registry is in memory and will not survive restarts");
            Arc::new(MemoryRegistry::new())
        }
    };

    let topology = SharedTopology::resolve(
        config.fan_out_topic_arn.clone(),
        config.worker_parameter.clone(),
        &cloud,
    )
    .await
    .context("Failed to resolve shared topology")?;
    tracing::info!(
        fan_out_topic = %topology.fan_out_topic_arn,
        worker_parameter = %topology.worker_parameter,
        "✓ Shared topology resolved"
    );

    let services = Arc::new(ChannelServices::local(cloud, registry, topology));

    // Durable rows over a fresh in-process cloud: bring their resources back
    if config.database_url.is_some() {
        let restored = restore_channels(&services)
            .await
            .context("Failed to restore resources of registered channels")?;
        if restored > 0 {
            tracing::warn!("Recreated resources of {} registered channel(s); queued messages were lost", restored);
        }
    }

    let orchestrator = match &config.database_url {
        Some(db_url) => {
            tracing::info!("Connecting to workflow store (schema: {})", WORKFLOW_SCHEMA);
            let store = Arc::new(
                PostgresProvider::new_with_schema(db_url, Some(WORKFLOW_SCHEMA))
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to initialize workflow store: {}", e))?,
            );
            store
                .initialize_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize workflow schema: {}", e))?;
            ChannelOrchestrator::start(store, services).await
        }
        None => {
            let store = Arc::new(
                SqliteProvider::new_in_memory()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to initialize workflow store: {}", e))?,
            );
            ChannelOrchestrator::start(store, services).await
        }
    };

    tracing::info!("✓ Workflow runtime ready");
    Ok(orchestrator)
}
