//! sessh-core: Shared library for the sessh session layer.
//!
//! This crate provides:
//! - Channel request decoding for the length-prefixed wire format
//! - Request dispatch rules for interactive session channels
//! - A line-editing terminal abstraction over a session channel
//! - Transport abstractions (handshake, connection, channel)
//! - Logging and server metrics

pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod protocol;
pub mod terminal;
pub mod transport;

pub use error::{Error, Result};
pub use logging::{LogFormat, init_logging};
pub use metrics::ServerMetrics;
