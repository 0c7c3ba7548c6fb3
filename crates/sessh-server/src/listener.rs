//! TCP accept loop.
//!
//! Binds the listening socket and runs handshakes. Each accepted stream
//! gets its own task: the handshake backend either produces an
//! authenticated connection, which is then supervised until it ends, or
//! fails and takes only that one attempt down with it. The accept loop
//! itself never stops on per-connection errors.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use sessh_core::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_HOST_KEY_PATHS, DEFAULT_PORT, DEFAULT_STATS_INTERVAL,
};
use sessh_core::transport::Handshake;
use sessh_core::{Result, ServerMetrics};

use crate::connection::serve_connection;

/// Server runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the TCP listener binds.
    pub bind_addr: SocketAddr,
    /// Host key files probed at startup.
    pub key_paths: Vec<PathBuf>,
    /// Interval between statistics reports.
    pub stats_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(DEFAULT_BIND_ADDR, DEFAULT_PORT),
            key_paths: DEFAULT_HOST_KEY_PATHS.iter().map(PathBuf::from).collect(),
            stats_interval: DEFAULT_STATS_INTERVAL,
        }
    }
}

/// Bound listening socket plus the shared state every connection task needs.
pub struct Listener<H: Handshake> {
    tcp: TcpListener,
    local_addr: SocketAddr,
    handshake: Arc<H>,
    metrics: Arc<ServerMetrics>,
}

impl<H: Handshake> Listener<H> {
    /// Bind the configured address.
    pub async fn bind(config: &ServerConfig, handshake: H) -> Result<Self> {
        let tcp = TcpListener::bind(config.bind_addr).await?;
        let local_addr = tcp.local_addr()?;
        info!(addr = %local_addr, "Listening");
        Ok(Self {
            tcp,
            local_addr,
            handshake: Arc::new(handshake),
            metrics: Arc::new(ServerMetrics::new()),
        })
    }

    /// The bound address, with the real port when 0 was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle on the server-wide counters.
    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Accept connections forever.
    pub async fn serve(self) -> Result<()> {
        loop {
            match self.tcp.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "Accepted TCP connection");
                    let handshake = Arc::clone(&self.handshake);
                    let metrics = Arc::clone(&self.metrics);
                    tokio::spawn(async move {
                        match handshake.handshake(stream, peer).await {
                            Ok(conn) => serve_connection(conn, metrics).await,
                            Err(err) => {
                                metrics.handshake_failed();
                                error!(%peer, error = %err, "Handshake failed");
                            }
                        }
                    });
                }
                Err(err) => {
                    warn!(error = %err, "Accept error");
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
