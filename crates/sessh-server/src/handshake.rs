//! Placeholder secure-transport backend.
//!
//! The server binary ships without a linked cryptographic backend. This
//! module provides the [`Handshake`] implementation used in that build:
//! it holds the loaded host keys and the authentication policy that a
//! real backend would consume, announces the situation at startup, and
//! refuses every connection attempt. The rest of the server (listener,
//! supervisor, session loop) is generic over the transport traits and
//! does not change when a backend is linked in.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::{info, warn};

use sessh_core::transport::auth::AuthPolicy;
use sessh_core::transport::{
    ChannelEvent, Handshake, IncomingChannel, RejectReason, SecureConnection, SessionChannel,
};
use sessh_core::{Error, Result};

use crate::keys::HostKeys;

/// Handshake backend used when no secure transport is linked.
#[derive(Debug, Clone)]
pub struct UnconfiguredBackend<P: AuthPolicy> {
    /// Host keys a linked backend would present to peers.
    pub host_keys: HostKeys,
    /// Policy a linked backend would consult during authentication.
    pub policy: P,
}

impl<P: AuthPolicy> UnconfiguredBackend<P> {
    pub fn new(host_keys: HostKeys, policy: P) -> Self {
        info!(
            host_keys = host_keys.len(),
            "No secure-transport backend linked; connections will be refused"
        );
        Self { host_keys, policy }
    }
}

impl<P: AuthPolicy> Handshake for UnconfiguredBackend<P> {
    type Connection = NeverConnection;

    fn handshake(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
    ) -> impl Future<Output = Result<Self::Connection>> + Send {
        warn!(%peer, "Refusing connection: no secure-transport backend linked");
        drop(stream);
        async move {
            Err(Error::Handshake {
                message: "no secure-transport backend linked".to_string(),
            })
        }
    }
}

// =============================================================================
// Uninhabited Connection Chain
// =============================================================================

/// Connection type of [`UnconfiguredBackend`]. No value of this type can
/// exist; the trait impls below are unreachable and only satisfy the
/// associated-type requirements.
#[derive(Debug)]
pub enum NeverConnection {}

/// Incoming-channel type of [`NeverConnection`].
#[derive(Debug)]
pub enum NeverIncoming {}

/// Channel type of [`NeverIncoming`].
#[derive(Debug)]
pub enum NeverChannel {}

impl SecureConnection for NeverConnection {
    type Incoming = NeverIncoming;

    fn accept(&mut self) -> impl Future<Output = Result<Self::Incoming>> + Send {
        async move { match *self {} }
    }

    fn remote_addr(&self) -> SocketAddr {
        match *self {}
    }

    fn is_connected(&self) -> bool {
        match *self {}
    }

    fn close(&mut self) {
        match *self {}
    }
}

impl IncomingChannel for NeverIncoming {
    type Channel = NeverChannel;

    fn channel_type(&self) -> &str {
        match *self {}
    }

    fn extra_data(&self) -> &[u8] {
        match *self {}
    }

    fn accept(self) -> impl Future<Output = Result<Self::Channel>> + Send {
        async move { match self {} }
    }

    fn reject(
        self,
        _reason: RejectReason,
        _message: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        async move { match self {} }
    }
}

impl SessionChannel for NeverChannel {
    fn read_event(&mut self) -> impl Future<Output = Result<ChannelEvent>> + Send {
        async move { match *self {} }
    }

    fn write(&mut self, _data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        async move { match *self {} }
    }

    fn ack_request(&mut self, _accepted: bool) -> impl Future<Output = Result<()>> + Send {
        async move { match *self {} }
    }

    fn close(&mut self) {
        match *self {}
    }
}

// =============================================================================
// Tests
// =============================================================================
