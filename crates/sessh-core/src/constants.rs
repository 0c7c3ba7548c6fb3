//! Protocol and configuration constants for sessh.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

// =============================================================================
// Protocol Constants
// =============================================================================

/// Channel type for interactive terminal sessions.
///
/// Channels announcing any other type are rejected at accept time.
pub const SESSION_CHANNEL_TYPE: &str = "session";

/// Width of a length prefix or integer field on the wire (big-endian u32).
pub const U32_WIRE_LEN: usize = 4;

/// Control line that ends an interactive session when typed by the peer.
pub const QUIT_COMMAND: &str = "quit";

// =============================================================================
// Defaults
// =============================================================================

/// Default TCP port the server listens on.
pub const DEFAULT_PORT: u16 = 2022;

/// Default bind address (all interfaces).
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Prompt written at the start of every input line.
pub const DEFAULT_PROMPT: &str = "> ";

/// Default interval between server statistics reports.
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(3600);

/// Default host key files probed at startup, relative to the working directory.
pub const DEFAULT_HOST_KEY_PATHS: [&str; 3] = ["id_rsa", "id_dsa", "id_ecdsa"];

// =============================================================================
// Tests
// =============================================================================
