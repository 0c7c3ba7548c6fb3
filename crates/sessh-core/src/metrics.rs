//! Server-wide counters.
//!
//! One [`ServerMetrics`] is shared across every connection and session task
//! behind an `Arc`; all counters are relaxed atomics since they feed
//! periodic reports, not control flow.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Live counters for one server process.
#[derive(Debug)]
pub struct ServerMetrics {
    started: Instant,
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    handshake_failures: AtomicU64,
    channels_rejected: AtomicU64,
    sessions_total: AtomicU64,
    sessions_active: AtomicU64,
    lines_read: AtomicU64,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerMetrics {
    /// Create a fresh counter set; uptime starts now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            connections_total: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            handshake_failures: AtomicU64::new(0),
            channels_rejected: AtomicU64::new(0),
            sessions_total: AtomicU64::new(0),
            sessions_active: AtomicU64::new(0),
            lines_read: AtomicU64::new(0),
        }
    }

    /// A handshake completed and a connection supervisor is starting.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection supervisor finished.
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// A handshake attempt failed before producing a connection.
    pub fn handshake_failed(&self) {
        self.handshake_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A channel open was refused, e.g. for an unknown type.
    pub fn channel_rejected(&self) {
        self.channels_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A session channel was accepted and its loop is starting.
    pub fn session_opened(&self) {
        self.sessions_total.fetch_add(1, Ordering::Relaxed);
        self.sessions_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A session loop finished.
    pub fn session_closed(&self) {
        self.sessions_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// One line of input was surfaced by a session.
    pub fn line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Capture the current counter values.
    pub fn snapshot(&self) -> ServerStats {
        ServerStats {
            uptime_secs: self.started.elapsed().as_secs(),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            handshake_failures: self.handshake_failures.load(Ordering::Relaxed),
            channels_rejected: self.channels_rejected.load(Ordering::Relaxed),
            sessions_total: self.sessions_total.load(Ordering::Relaxed),
            sessions_active: self.sessions_active.load(Ordering::Relaxed),
            lines_read: self.lines_read.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`ServerMetrics`], suitable for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    pub uptime_secs: u64,
    pub connections_total: u64,
    pub connections_active: u64,
    pub handshake_failures: u64,
    pub channels_rejected: u64,
    pub sessions_total: u64,
    pub sessions_active: u64,
    pub lines_read: u64,
}

// =============================================================================
// Tests
// =============================================================================
