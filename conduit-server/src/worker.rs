use std::sync::Arc;
use std::time::Duration;

use conduit_orchestrations::messaging::MessageRelay;
use conduit_orchestrations::topology::ChannelServices;

const MAX_MESSAGES_PER_QUEUE: usize = 10;

/// Drain every worker-bound queue on a fixed interval
pub async fn run_relay(services: Arc<ChannelServices>, poll_interval: Duration) {
    let relay = MessageRelay::new(services);
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!("Relay worker polling every {:?}", poll_interval);

    loop {
        ticker.tick().await;
        match relay.poll_bound_queues(MAX_MESSAGES_PER_QUEUE).await {
            Ok(report) if report.relayed > 0 || report.failed > 0 => {
                tracing::info!(
                    relayed = report.relayed,
                    failed = report.failed,
                    "Relay pass complete"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Relay pass failed: {}", e),
        }
    }
}
