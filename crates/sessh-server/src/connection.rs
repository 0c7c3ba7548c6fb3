//! Per-connection supervisor.
//!
//! One supervisor task owns each authenticated connection. It accepts
//! channel opens, admits only session channels, and spawns one session
//! task per accepted channel. Everything else is refused with reason
//! code 3 and a diagnostic naming the offending type; the connection
//! itself stays up so the peer can try again.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use sessh_core::ServerMetrics;
use sessh_core::constants::SESSION_CHANNEL_TYPE;
use sessh_core::transport::{IncomingChannel, RejectReason, SecureConnection};

use crate::session::run_session;

/// Connection task body: accept channels until the peer disconnects.
pub async fn serve_connection<C: SecureConnection>(mut conn: C, metrics: Arc<ServerMetrics>) {
    let peer = conn.remote_addr();
    metrics.connection_opened();
    info!(%peer, "Connection established");

    loop {
        match conn.accept().await {
            Ok(incoming) => handle_incoming(incoming, peer, &metrics).await,
            Err(err) if err.is_disconnect() => {
                info!(%peer, "Connection closed by peer");
                break;
            }
            Err(err) => {
                warn!(%peer, error = %err, "Connection error");
                break;
            }
        }
    }

    conn.close();
    metrics.connection_closed();
    info!(%peer, "Connection closed");
}

/// Answer one channel open: accept sessions, refuse everything else.
async fn handle_incoming<I: IncomingChannel>(
    incoming: I,
    peer: SocketAddr,
    metrics: &Arc<ServerMetrics>,
) {
    let channel_type = incoming.channel_type().to_string();
    if channel_type != SESSION_CHANNEL_TYPE {
        warn!(%peer, channel_type = %channel_type, "Rejecting channel of unknown type");
        metrics.channel_rejected();
        let message = format!("unknown channel type {channel_type}");
        if let Err(err) = incoming
            .reject(RejectReason::UnknownChannelType, &message)
            .await
        {
            debug!(%peer, error = %err, "Channel rejection not delivered");
        }
        return;
    }

    if !incoming.extra_data().is_empty() {
        debug!(
            %peer,
            extra = %String::from_utf8_lossy(incoming.extra_data()),
            "Channel open extra data"
        );
    }

    match incoming.accept().await {
        Ok(channel) => {
            tokio::spawn(run_session(channel, peer, Arc::clone(metrics)));
        }
        Err(err) => warn!(%peer, error = %err, "Failed to accept channel"),
    }
}

// =============================================================================
// Tests
// =============================================================================
