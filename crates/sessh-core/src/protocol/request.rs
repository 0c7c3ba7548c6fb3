//! Channel request and terminal size types.

use std::fmt;

use bytes::Bytes;

/// Request type tags observed on session channels.
///
/// The wire carries these as free-form strings; unrecognized tags are kept
/// verbatim in [`RequestKind::Other`] so they can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Allocate or resize the peer's terminal.
    PtyReq,
    /// Start the default shell.
    Shell,
    /// Set an environment variable.
    Env,
    /// Run a single command.
    Exec,
    /// Forward an X11 display.
    X11Req,
    /// Forward the peer's auth agent.
    AuthAgentReq,
    /// Anything this server does not recognize.
    Other(String),
}

impl RequestKind {
    /// Map a wire-level request name to its tag.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "pty-req" => RequestKind::PtyReq,
            "shell" => RequestKind::Shell,
            "env" => RequestKind::Env,
            "exec" => RequestKind::Exec,
            "x11-req" => RequestKind::X11Req,
            "auth-agent-req@openssh.com" => RequestKind::AuthAgentReq,
            other => RequestKind::Other(other.to_string()),
        }
    }

    /// The wire-level request name.
    pub fn as_str(&self) -> &str {
        match self {
            RequestKind::PtyReq => "pty-req",
            RequestKind::Shell => "shell",
            RequestKind::Env => "env",
            RequestKind::Exec => "exec",
            RequestKind::X11Req => "x11-req",
            RequestKind::AuthAgentReq => "auth-agent-req@openssh.com",
            RequestKind::Other(name) => name,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded out-of-band control message carried on a session channel.
///
/// Created by the transport layer when it sees a request frame, consumed
/// exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    /// What the peer is asking for.
    pub kind: RequestKind,
    /// Whether the peer expects an accept/reject reply.
    pub want_reply: bool,
    /// Raw, kind-specific payload, not yet decoded.
    pub payload: Bytes,
}

impl ChannelRequest {
    /// Build a request from its wire-level parts.
    pub fn new(name: &str, want_reply: bool, payload: impl Into<Bytes>) -> Self {
        Self {
            kind: RequestKind::from_wire(name),
            want_reply,
            payload: payload.into(),
        }
    }
}

/// Terminal dimensions in character cells.
///
/// Both dimensions are at least 1; use [`TermSize::new`] to enforce this
/// when the values come from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub width: u32,
    pub height: u32,
}

impl TermSize {
    /// Validate decoded dimensions. A zero in either dimension yields `None`.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width >= 1 && height >= 1).then_some(Self { width, height })
    }
}

impl fmt::Display for TermSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// =============================================================================
// Tests
// =============================================================================
