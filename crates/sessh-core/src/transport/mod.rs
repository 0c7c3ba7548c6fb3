//! Secure-transport abstractions.
//!
//! The cryptographic transport is an external collaborator: something else
//! performs the handshake and produces an authenticated connection carrying
//! multiplexed channels. This module defines the seam those backends plug
//! into, plus the event and rejection types shared across it. Everything
//! above this seam (supervisor, session loop, dispatcher) is generic over
//! these traits, so the same logic runs over a production backend or the
//! in-memory transport used by the tests.

pub mod auth;

use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::ChannelRequest;

// =============================================================================
// Channel Events
// =============================================================================

/// One inbound item on a session channel.
///
/// Channels interleave terminal byte data with out-of-band control requests;
/// the two are delivered as distinct variants rather than one being smuggled
/// through the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Raw terminal input bytes from the peer.
    Data(Bytes),
    /// A decoded out-of-band request.
    Request(ChannelRequest),
}

// =============================================================================
// Channel Open Rejection
// =============================================================================

/// RFC 4254 §5.1 reason codes for refusing a channel open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AdministrativelyProhibited,
    ConnectFailed,
    UnknownChannelType,
    ResourceShortage,
}

impl RejectReason {
    /// Wire-level reason code.
    pub fn code(self) -> u32 {
        match self {
            RejectReason::AdministrativelyProhibited => 1,
            RejectReason::ConnectFailed => 2,
            RejectReason::UnknownChannelType => 3,
            RejectReason::ResourceShortage => 4,
        }
    }
}

// =============================================================================
// Session Channel Trait
// =============================================================================

/// An accepted bidirectional channel hosting one terminal session.
///
/// A channel has exactly one owner. The owner must keep calling
/// [`read_event`](SessionChannel::read_event) until it closes the channel;
/// a channel nobody reads stalls its peer.
pub trait SessionChannel: Send + Sync + 'static {
    /// Read the next data chunk or control request, in delivery order.
    fn read_event(&mut self) -> impl Future<Output = Result<ChannelEvent>> + Send;

    /// Write terminal output bytes to the peer.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Send the accept/reject reply for the most recent request.
    fn ack_request(&mut self, accepted: bool) -> impl Future<Output = Result<()>> + Send;

    /// Close the channel. Safe to call more than once; the underlying
    /// resources are also released on drop.
    fn close(&mut self);
}

// =============================================================================
// Incoming Channel Trait
// =============================================================================

/// A channel the peer has opened but we have not yet answered.
pub trait IncomingChannel: Send + 'static {
    /// The channel produced by accepting.
    type Channel: SessionChannel;

    /// Application channel type announced by the peer.
    fn channel_type(&self) -> &str;

    /// Opaque data sent along with the open request.
    fn extra_data(&self) -> &[u8];

    /// Accept the channel.
    fn accept(self) -> impl Future<Output = Result<Self::Channel>> + Send;

    /// Refuse the channel with a reason code and diagnostic message.
    fn reject(self, reason: RejectReason, message: &str)
    -> impl Future<Output = Result<()>> + Send;
}

// =============================================================================
// Connection Trait
// =============================================================================

/// An authenticated connection produced by a completed handshake.
pub trait SecureConnection: Send + 'static {
    /// The pending-channel type produced by [`accept`](SecureConnection::accept).
    type Incoming: IncomingChannel;

    /// Wait for the peer to open the next channel.
    ///
    /// The connection's owner must keep calling this until the connection is
    /// torn down; channel traffic is only demultiplexed while someone is
    /// accepting.
    fn accept(&mut self) -> impl Future<Output = Result<Self::Incoming>> + Send;

    /// The peer's address, for logging.
    fn remote_addr(&self) -> SocketAddr;

    /// Whether the connection is still usable.
    fn is_connected(&self) -> bool;

    /// Close the connection. Safe to call more than once; the underlying
    /// resources are also released on drop.
    fn close(&mut self);
}

// =============================================================================
// Handshake Trait
// =============================================================================

/// Entry point of a secure-transport backend.
///
/// Implementations own the cryptography and authentication entirely; the
/// listener hands them a raw TCP stream and gets back an authenticated
/// connection or an error scoped to that one attempt.
pub trait Handshake: Send + Sync + 'static {
    /// Connection type produced on success.
    type Connection: SecureConnection;

    /// Run the handshake on a freshly accepted stream.
    fn handshake(
        &self,
        stream: tokio::net::TcpStream,
        peer: SocketAddr,
    ) -> impl Future<Output = Result<Self::Connection>> + Send;
}

// =============================================================================
// Tests
// =============================================================================
