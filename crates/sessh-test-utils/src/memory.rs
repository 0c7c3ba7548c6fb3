//! In-memory transport for testing without real cryptography or network.
//!
//! Each construct here is one half of a pair: the server half implements
//! the sessh-core transport traits and is handed to the code under test,
//! while the peer half stays with the test and plays the remote client.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};

use sessh_core::error::{Error, Result};
use sessh_core::protocol::ChannelRequest;
use sessh_core::transport::{
    ChannelEvent, Handshake, IncomingChannel, RejectReason, SecureConnection, SessionChannel,
};

/// Buffer depth for per-channel queues.
const QUEUE_DEPTH: usize = 64;

// =============================================================================
// Channel Pair
// =============================================================================

/// Server half of an in-memory session channel.
#[derive(Debug)]
pub struct MemoryChannel {
    events: mpsc::Receiver<ChannelEvent>,
    output: Option<mpsc::Sender<Bytes>>,
    acks: Option<mpsc::Sender<bool>>,
    closed: bool,
}

impl MemoryChannel {
    /// Whether [`SessionChannel::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl SessionChannel for MemoryChannel {
    fn read_event(&mut self) -> impl Future<Output = Result<ChannelEvent>> + Send {
        async move {
            if self.closed {
                return Err(Error::ConnectionClosed);
            }
            self.events.recv().await.ok_or(Error::ConnectionClosed)
        }
    }

    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        let data = Bytes::copy_from_slice(data);
        async move {
            let Some(tx) = &self.output else {
                return Err(Error::ConnectionClosed);
            };
            tx.send(data).await.map_err(|_| Error::ConnectionClosed)
        }
    }

    fn ack_request(&mut self, accepted: bool) -> impl Future<Output = Result<()>> + Send {
        async move {
            let Some(tx) = &self.acks else {
                return Err(Error::ConnectionClosed);
            };
            tx.send(accepted).await.map_err(|_| Error::ConnectionClosed)
        }
    }

    fn close(&mut self) {
        self.closed = true;
        // Dropping the senders wakes the remote half with end-of-stream.
        self.output = None;
        self.acks = None;
    }
}

/// Peer (client) half of an in-memory session channel.
#[derive(Debug)]
pub struct MemoryRemote {
    events: mpsc::Sender<ChannelEvent>,
    output: mpsc::Receiver<Bytes>,
    acks: mpsc::Receiver<bool>,
}

impl MemoryRemote {
    /// Deliver terminal input bytes, as if the user typed them.
    pub async fn send_data(&self, data: impl Into<Bytes>) -> Result<()> {
        self.events
            .send(ChannelEvent::Data(data.into()))
            .await
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Deliver an out-of-band channel request.
    pub async fn send_request(&self, req: ChannelRequest) -> Result<()> {
        self.events
            .send(ChannelEvent::Request(req))
            .await
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Next chunk of terminal output, or `None` once the server closed.
    pub async fn recv_output(&mut self) -> Option<Bytes> {
        self.output.recv().await
    }

    /// Next request acknowledgement, or `None` once the server closed.
    pub async fn recv_ack(&mut self) -> Option<bool> {
        self.acks.recv().await
    }

    /// Acknowledgement already queued, without waiting for one.
    pub fn try_recv_ack(&mut self) -> Option<bool> {
        self.acks.try_recv().ok()
    }

    /// Collect all remaining output until the server closes the channel.
    pub async fn output_to_end(&mut self) -> Vec<u8> {
        let mut all = Vec::new();
        while let Some(chunk) = self.output.recv().await {
            all.extend_from_slice(&chunk);
        }
        all
    }
}

/// Create a connected channel pair. Dropping the remote half looks like a
/// peer hangup to the server half.
pub fn memory_channel_pair() -> (MemoryChannel, MemoryRemote) {
    let (events_tx, events_rx) = mpsc::channel(QUEUE_DEPTH);
    let (output_tx, output_rx) = mpsc::channel(QUEUE_DEPTH);
    let (acks_tx, acks_rx) = mpsc::channel(QUEUE_DEPTH);

    let channel = MemoryChannel {
        events: events_rx,
        output: Some(output_tx),
        acks: Some(acks_tx),
        closed: false,
    };
    let remote = MemoryRemote {
        events: events_tx,
        output: output_rx,
        acks: acks_rx,
    };
    (channel, remote)
}

// =============================================================================
// Channel Open Plumbing
// =============================================================================

#[derive(Debug)]
enum OpenDecision {
    Accept,
    Reject { code: u32, message: String },
}

/// A channel the in-memory peer has opened but the server has not answered.
#[derive(Debug)]
pub struct MemoryIncoming {
    channel_type: String,
    extra_data: Bytes,
    channel: MemoryChannel,
    decision: oneshot::Sender<OpenDecision>,
}

impl IncomingChannel for MemoryIncoming {
    type Channel = MemoryChannel;

    fn channel_type(&self) -> &str {
        &self.channel_type
    }

    fn extra_data(&self) -> &[u8] {
        &self.extra_data
    }

    fn accept(self) -> impl Future<Output = Result<MemoryChannel>> + Send {
        async move {
            self.decision
                .send(OpenDecision::Accept)
                .map_err(|_| Error::ConnectionClosed)?;
            Ok(self.channel)
        }
    }

    fn reject(
        self,
        reason: RejectReason,
        message: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        let decision = OpenDecision::Reject {
            code: reason.code(),
            message: message.to_string(),
        };
        async move {
            self.decision
                .send(decision)
                .map_err(|_| Error::ConnectionClosed)?;
            Ok(())
        }
    }
}

// =============================================================================
// Connection Pair
// =============================================================================

/// Server half of an in-memory authenticated connection.
#[derive(Debug)]
pub struct MemoryConnection {
    remote_addr: SocketAddr,
    incoming: mpsc::Receiver<MemoryIncoming>,
    connected: bool,
}

impl SecureConnection for MemoryConnection {
    type Incoming = MemoryIncoming;

    fn accept(&mut self) -> impl Future<Output = Result<MemoryIncoming>> + Send {
        async move {
            if !self.connected {
                return Err(Error::ConnectionClosed);
            }
            self.incoming.recv().await.ok_or(Error::ConnectionClosed)
        }
    }

    fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        self.connected = false;
        self.incoming.close();
    }
}

/// Peer half of an in-memory connection: opens channels toward the server.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    opens: mpsc::Sender<MemoryIncoming>,
}

impl MemoryConnector {
    /// Open a channel of `channel_type` and wait for the server's decision.
    ///
    /// Returns the remote half on acceptance, or
    /// [`Error::ChannelRejected`] carrying the server's reason code and
    /// message on refusal.
    pub async fn open_channel(&self, channel_type: &str, extra_data: &[u8]) -> Result<MemoryRemote> {
        let (channel, remote) = memory_channel_pair();
        let (decision_tx, decision_rx) = oneshot::channel();
        let incoming = MemoryIncoming {
            channel_type: channel_type.to_string(),
            extra_data: Bytes::copy_from_slice(extra_data),
            channel,
            decision: decision_tx,
        };

        self.opens
            .send(incoming)
            .await
            .map_err(|_| Error::ConnectionClosed)?;
        match decision_rx.await.map_err(|_| Error::ConnectionClosed)? {
            OpenDecision::Accept => Ok(remote),
            OpenDecision::Reject { code, message } => Err(Error::ChannelRejected { code, message }),
        }
    }
}

/// Create a connected connection pair; `remote_addr` is what the server half
/// reports as its peer.
pub fn memory_connection_pair(remote_addr: SocketAddr) -> (MemoryConnection, MemoryConnector) {
    let (opens_tx, opens_rx) = mpsc::channel(QUEUE_DEPTH);
    let connection = MemoryConnection {
        remote_addr,
        incoming: opens_rx,
        connected: true,
    };
    let connector = MemoryConnector { opens: opens_tx };
    (connection, connector)
}

// =============================================================================
// Handshake
// =============================================================================

/// Handshake that pairs every inbound TCP stream with an in-memory
/// connection and hands the peer half back to the test.
///
/// The raw stream itself is dropped after the handshake: all traffic flows
/// through the in-memory pair, the socket only triggers the accept path.
/// Clones share the failure script, so a test can keep one handle while
/// the listener owns another.
#[derive(Debug, Clone)]
pub struct MemoryHandshake {
    connectors: mpsc::UnboundedSender<MemoryConnector>,
    failures: Arc<AtomicUsize>,
}

impl MemoryHandshake {
    /// Create the handshake plus the stream of peer halves, one per
    /// successfully "authenticated" connection.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryConnector>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                connectors: tx,
                failures: Arc::new(AtomicUsize::new(0)),
            },
            rx,
        )
    }

    /// Make the next `n` handshake attempts fail.
    pub fn fail_next(&self, n: usize) {
        self.failures.fetch_add(n, Ordering::SeqCst);
    }
}

impl Handshake for MemoryHandshake {
    type Connection = MemoryConnection;

    fn handshake(
        &self,
        _stream: tokio::net::TcpStream,
        peer: SocketAddr,
    ) -> impl Future<Output = Result<MemoryConnection>> + Send {
        let scripted_failure = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let result = if scripted_failure {
            Err(Error::Handshake {
                message: "scripted failure".to_string(),
            })
        } else {
            let (connection, connector) = memory_connection_pair(peer);
            match self.connectors.send(connector) {
                Ok(()) => Ok(connection),
                Err(_) => Err(Error::Handshake {
                    message: "no test driver waiting for connections".to_string(),
                }),
            }
        };
        async move { result }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use sessh_core::protocol::RequestKind;

    use super::*;

    fn peer_addr() -> SocketAddr {
        "127.0.0.1:50022".parse().unwrap()
    }

    #[tokio::test]
    async fn channel_pair_moves_data_and_requests() {
        let (mut channel, remote) = memory_channel_pair();

        remote.send_data(Bytes::from_static(b"ls\r")).await.unwrap();
        remote
            .send_request(ChannelRequest::new("shell", true, &[][..]))
            .await
            .unwrap();

        match channel.read_event().await.unwrap() {
            ChannelEvent::Data(data) => assert_eq!(&data[..], b"ls\r"),
            other => panic!("expected data, got {other:?}"),
        }
        match channel.read_event().await.unwrap() {
            ChannelEvent::Request(req) => assert_eq!(req.kind, RequestKind::Shell),
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn channel_pair_moves_output_and_acks() {
        let (mut channel, mut remote) = memory_channel_pair();

        channel.write(b"> ").await.unwrap();
        channel.ack_request(true).await.unwrap();

        assert_eq!(&remote.recv_output().await.unwrap()[..], b"> ");
        assert_eq!(remote.recv_ack().await, Some(true));
    }

    #[tokio::test]
    async fn closing_the_channel_ends_remote_streams() {
        let (mut channel, mut remote) = memory_channel_pair();

        assert!(!channel.is_closed());
        channel.close();
        channel.close();
        assert!(channel.is_closed());

        assert!(channel.write(b"x").await.is_err());
        assert!(remote.recv_output().await.is_none());
        assert!(remote.recv_ack().await.is_none());
    }

    #[tokio::test]
    async fn remote_hangup_surfaces_as_closed() {
        let (mut channel, remote) = memory_channel_pair();
        drop(remote);
        assert!(matches!(
            channel.read_event().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn accepted_channel_reaches_the_opener() {
        let (mut connection, connector) = memory_connection_pair(peer_addr());

        let open = tokio::spawn(async move { connector.open_channel("session", b"hi").await });

        let incoming = connection.accept().await.unwrap();
        assert_eq!(incoming.channel_type(), "session");
        assert_eq!(incoming.extra_data(), b"hi");
        let mut channel = incoming.accept().await.unwrap();
        channel.write(b"welcome").await.unwrap();

        let mut remote = open.await.unwrap().unwrap();
        assert_eq!(&remote.recv_output().await.unwrap()[..], b"welcome");
    }

    #[tokio::test]
    async fn rejected_channel_carries_code_and_message() {
        let (mut connection, connector) = memory_connection_pair(peer_addr());

        let open = tokio::spawn(async move { connector.open_channel("direct-tcpip", &[]).await });

        let incoming = connection.accept().await.unwrap();
        incoming
            .reject(RejectReason::UnknownChannelType, "unknown channel type direct-tcpip")
            .await
            .unwrap();

        match open.await.unwrap() {
            Err(Error::ChannelRejected { code, message }) => {
                assert_eq!(code, 3);
                assert!(message.contains("direct-tcpip"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_connection_refuses_new_channels() {
        let (mut connection, connector) = memory_connection_pair(peer_addr());

        assert!(connection.is_connected());
        connection.close();
        assert!(!connection.is_connected());

        assert!(connection.accept().await.is_err());
        assert!(connector.open_channel("session", &[]).await.is_err());
    }

    #[tokio::test]
    async fn connection_reports_peer_address() {
        let (connection, _connector) = memory_connection_pair(peer_addr());
        assert_eq!(connection.remote_addr(), peer_addr());
    }

    #[tokio::test]
    async fn handshake_failure_injection_is_consumed_in_order() {
        let (handshake, mut connectors) = MemoryHandshake::new();
        handshake.fail_next(1);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        for attempt in 0..2 {
            let _client = tokio::net::TcpStream::connect(addr).await.unwrap();
            let (stream, peer) = listener.accept().await.unwrap();
            let result = handshake.handshake(stream, peer).await;
            if attempt == 0 {
                assert!(matches!(result, Err(Error::Handshake { .. })));
            } else {
                assert!(result.is_ok());
                assert!(connectors.recv().await.is_some());
            }
        }
    }
}
