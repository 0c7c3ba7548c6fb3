//! Authentication policy hooks for secure-transport backends.
//!
//! Backends call into an [`AuthPolicy`] during the handshake. The stock
//! policy here accepts every attempt and records it, which suits a server
//! whose job is observing what peers try rather than keeping them out.

use std::net::SocketAddr;

use tracing::warn;

/// Decides whether an authentication attempt succeeds.
pub trait AuthPolicy: Send + Sync + 'static {
    /// A password attempt. The cleartext password is available for
    /// verification but implementations should avoid logging it.
    fn allow_password(&self, user: &str, password: &str, remote: SocketAddr) -> bool;

    /// A public-key attempt with the key's algorithm name and wire blob.
    fn allow_public_key(&self, user: &str, algorithm: &str, key: &[u8], remote: SocketAddr)
    -> bool;

    /// A keyboard-interactive attempt.
    fn allow_keyboard_interactive(&self, user: &str, remote: SocketAddr) -> bool;
}

/// Policy that accepts everything and logs each attempt at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndAccept;

impl AuthPolicy for LogAndAccept {
    fn allow_password(&self, user: &str, _password: &str, remote: SocketAddr) -> bool {
        warn!(user = %user, remote = %remote, "Accepting password auth attempt");
        true
    }

    fn allow_public_key(
        &self,
        user: &str,
        algorithm: &str,
        _key: &[u8],
        remote: SocketAddr,
    ) -> bool {
        warn!(user = %user, algorithm = %algorithm, remote = %remote, "Accepting public key auth attempt");
        true
    }

    fn allow_keyboard_interactive(&self, user: &str, remote: SocketAddr) -> bool {
        warn!(user = %user, remote = %remote, "Accepting keyboard-interactive auth attempt");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> SocketAddr {
        "203.0.113.9:50022".parse().unwrap()
    }

    #[test]
    fn log_and_accept_allows_everything() {
        let policy = LogAndAccept;
        assert!(policy.allow_password("root", "hunter2", remote()));
        assert!(policy.allow_public_key("admin", "ssh-ed25519", &[0x01, 0x02], remote()));
        assert!(policy.allow_keyboard_interactive("guest", remote()));
    }
}
