//! sessh-test-utils: Test infrastructure for sessh.
//!
//! Provides:
//! - An in-memory transport implementing the sessh-core transport traits,
//!   so supervisor and session logic can be exercised without a real
//!   secure-transport backend
//! - A scriptable handshake that hands the peer half of each connection
//!   back to the test

mod memory;

pub use memory::{
    MemoryChannel, MemoryConnection, MemoryConnector, MemoryHandshake, MemoryIncoming,
    MemoryRemote, memory_channel_pair, memory_connection_pair,
};
