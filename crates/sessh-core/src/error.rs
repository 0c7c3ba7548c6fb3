//! Error types for sessh-core.

use thiserror::Error;

/// Main error type for sessh operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Secure-transport handshake failed for one connection attempt.
    #[error("handshake failed: {message}")]
    Handshake { message: String },

    /// Error raised by a secure-transport backend.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Connection or channel was closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,

    /// A channel open request was refused by the remote side.
    #[error("channel rejected (code {code}): {message}")]
    ChannelRejected { code: u32, message: String },

    /// Invalid startup configuration.
    #[error("config error: {message}")]
    Config { message: String },
}

impl Error {
    /// Returns true if this error means the peer went away.
    ///
    /// Disconnects are routine for a server: they end one session or
    /// connection and are logged below warning level.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Error::ConnectionClosed | Error::Io(_))
    }
}

/// Convenience result type for sessh operations.
pub type Result<T> = std::result::Result<T, Error>;
