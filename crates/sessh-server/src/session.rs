//! Terminal session over one accepted channel.
//!
//! [`TerminalSession`] drives the line editor and applies request
//! dispositions: it acknowledges requests, tracks the negotiated terminal
//! size, and stops when a request or the peer ends the session.
//! [`run_session`] is the task body the supervisor spawns per channel; it
//! logs each completed line and terminates on the quit command.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use sessh_core::constants::{DEFAULT_PROMPT, QUIT_COMMAND};
use sessh_core::protocol::{ChannelRequest, TermSize, dispatch};
use sessh_core::terminal::{LineEditor, TermEvent};
use sessh_core::transport::SessionChannel;
use sessh_core::{Result, ServerMetrics};

/// One interactive session bound to one channel.
pub struct TerminalSession<C: SessionChannel> {
    editor: LineEditor<C>,
    peer: SocketAddr,
    size: Option<TermSize>,
    done: bool,
}

impl<C: SessionChannel> TerminalSession<C> {
    /// Take ownership of an accepted channel and start a session on it.
    pub fn new(channel: C, peer: SocketAddr) -> Self {
        Self {
            editor: LineEditor::new(channel, DEFAULT_PROMPT),
            peer,
            size: None,
            done: false,
        }
    }

    /// Terminal size from the most recent accepted `pty-req`, if any.
    pub fn size(&self) -> Option<TermSize> {
        self.size
    }

    /// Write output to the peer's terminal.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.editor.write(data).await
    }

    /// Read the next completed line.
    ///
    /// Requests arriving between lines are handled transparently: they are
    /// acknowledged and applied here, and only a request that carries text
    /// (`exec`) surfaces through this method. Returns `Ok(None)` once a
    /// request has ended the session.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        while !self.done {
            match self.editor.read_event().await? {
                TermEvent::Line(line) => return Ok(Some(line)),
                TermEvent::Request(req) => {
                    if let Some(line) = self.handle_request(&req).await? {
                        return Ok(Some(line));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Close the underlying channel.
    pub fn close(&mut self) {
        self.editor.close();
    }

    async fn handle_request(&mut self, req: &ChannelRequest) -> Result<Option<String>> {
        let disp = dispatch(req);
        debug!(
            peer = %self.peer,
            kind = %req.kind,
            want_reply = req.want_reply,
            accept = disp.accept,
            "Channel request"
        );

        if let Some(size) = disp.new_size {
            self.size = Some(size);
            debug!(peer = %self.peer, %size, "Terminal resized");
        }
        if disp.must_reply(req.want_reply) {
            self.editor.channel_mut().ack_request(disp.accept).await?;
        }
        if disp.terminate {
            self.done = true;
        }
        Ok(disp.line)
    }
}

/// Session task body: read lines until quit, a terminating request, or
/// disconnect, then close the channel.
pub async fn run_session<C: SessionChannel>(
    channel: C,
    peer: SocketAddr,
    metrics: Arc<ServerMetrics>,
) {
    metrics.session_opened();
    info!(%peer, "Session started");

    let mut session = TerminalSession::new(channel, peer);
    loop {
        match session.next_line().await {
            Ok(Some(line)) => {
                metrics.line_read();
                info!(%peer, line = %line, "Read line");
                if line == QUIT_COMMAND {
                    debug!(%peer, "Quit command received");
                    break;
                }
            }
            Ok(None) => break,
            Err(err) if err.is_disconnect() => {
                info!(%peer, "Peer disconnected");
                break;
            }
            Err(err) => {
                warn!(%peer, error = %err, "Session read failed");
                break;
            }
        }
    }

    session.close();
    metrics.session_closed();
    info!(%peer, "Session closed");
}

// =============================================================================
// Tests
// =============================================================================
