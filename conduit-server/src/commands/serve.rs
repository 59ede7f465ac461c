use anyhow::Result;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::{runtime, worker};

/// Run the API server and, unless disabled, the relay worker
pub async fn run(port: Option<u16>, no_relay: bool) -> Result<()> {
    let config = Config::load()?;
    let port = port.unwrap_or(config.server_port);

    tracing::info!("Starting Conduit server");
    let orchestrator = runtime::initialize(&config).await?;

    let relay_handle = if no_relay {
        tracing::info!("Relay worker disabled");
        None
    } else {
        let services = orchestrator.services().clone();
        let interval = config.relay_poll_interval;
        Some(tokio::spawn(async move {
            worker::run_relay(services, interval).await;
        }))
    };

    let state = AppState::new(orchestrator.clone());
    let host = config.server_host.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_server(&host, port, state).await {
            tracing::error!("API server error: {}", e);
        }
    });

    println!("✓ Conduit server ready");
    println!("  API: http://{}:{}", config.server_host, port);
    println!("  Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    api_handle.abort();
    if let Some(handle) = relay_handle {
        handle.abort();
    }
    orchestrator.shutdown().await;

    Ok(())
}
