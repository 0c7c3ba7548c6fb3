//! sessh-server: session-layer server over a pluggable secure transport.
//!
//! This crate provides:
//! - The TCP listener and per-connection handshake dispatch
//! - The per-connection channel accept loop
//! - The per-channel terminal session loop
//! - Host key loading, CLI parsing, and periodic statistics

pub mod cli;
pub mod connection;
pub mod handshake;
pub mod keys;
pub mod listener;
pub mod session;
pub mod stats;

pub use cli::Cli;
pub use listener::{Listener, ServerConfig};
