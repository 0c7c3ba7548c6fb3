//! Periodic statistics reporting.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use sessh_core::ServerMetrics;

/// Spawn the reporter task. The first report fires immediately, then one
/// per `interval`; the task runs until aborted.
pub fn spawn_stats_reporter(metrics: Arc<ServerMetrics>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let stats = metrics.snapshot();
            info!(
                uptime_secs = stats.uptime_secs,
                connections_total = stats.connections_total,
                connections_active = stats.connections_active,
                handshake_failures = stats.handshake_failures,
                channels_rejected = stats.channels_rejected,
                sessions_total = stats.sessions_total,
                sessions_active = stats.sessions_active,
                lines_read = stats.lines_read,
                "Server statistics"
            );
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
