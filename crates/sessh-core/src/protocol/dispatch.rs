//! Accept/reject rules for session channel requests.
//!
//! [`dispatch`] is a pure function from a request to a [`Disposition`]; the
//! session loop applies the disposition to its own state and the channel.
//! Keeping the rules side-effect free makes every case directly testable.

use crate::protocol::codec::{decode_pty_request, decode_string};
use crate::protocol::{ChannelRequest, RequestKind, TermSize};

/// When the accept/reject reply must be written back on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Reply only when the request set `want_reply`.
    IfRequested,
    /// Reply unconditionally. `exec` always acknowledges, matching peers
    /// that expect a reply for it whether or not they asked for one.
    Always,
}

/// What the session loop should do with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// Accept/reject value carried by the reply.
    pub accept: bool,
    /// Reply policy for this request kind.
    pub reply: ReplyMode,
    /// New terminal size to apply, if the request carried a valid one.
    pub new_size: Option<TermSize>,
    /// Text to surface to the caller as the final line of the session.
    pub line: Option<String>,
    /// Whether the session loop must stop after handling this request.
    pub terminate: bool,
}

impl Default for Disposition {
    /// The rejection disposition: refuse, no state change, keep reading.
    fn default() -> Self {
        Self {
            accept: false,
            reply: ReplyMode::IfRequested,
            new_size: None,
            line: None,
            terminate: false,
        }
    }
}

impl Disposition {
    fn accepted() -> Self {
        Self {
            accept: true,
            ..Self::default()
        }
    }

    /// Whether a reply must be written, given the request's `want_reply`.
    pub fn must_reply(&self, want_reply: bool) -> bool {
        want_reply || self.reply == ReplyMode::Always
    }
}

/// Decide how to handle one channel request.
///
/// - `pty-req`: accepted iff the size decodes with nonzero dimensions; the
///   decoded size is carried in `new_size`.
/// - `shell`: accepted iff the payload is empty (a shell with arguments is
///   not something this server runs).
/// - `env`: always accepted; the variable is not applied to anything.
/// - `exec`: the command string is surfaced as the session's final line and
///   the loop stops; a payload that fails to decode still stops the loop but
///   surfaces nothing. Both outcomes reply unconditionally.
/// - `x11-req`, `auth-agent-req`: refused, this server forwards neither.
/// - anything else: refused.
pub fn dispatch(req: &ChannelRequest) -> Disposition {
    match &req.kind {
        RequestKind::PtyReq => match decode_pty_request(&req.payload) {
            Some(size) => Disposition {
                new_size: Some(size),
                ..Disposition::accepted()
            },
            None => Disposition::default(),
        },
        RequestKind::Shell => {
            if req.payload.is_empty() {
                Disposition::accepted()
            } else {
                Disposition::default()
            }
        }
        RequestKind::Env => Disposition::accepted(),
        RequestKind::Exec => match decode_string(&req.payload) {
            Some((command, _)) => Disposition {
                reply: ReplyMode::Always,
                line: Some(String::from_utf8_lossy(command).into_owned()),
                terminate: true,
                ..Disposition::accepted()
            },
            None => Disposition {
                reply: ReplyMode::Always,
                terminate: true,
                ..Disposition::default()
            },
        },
        RequestKind::X11Req | RequestKind::AuthAgentReq => Disposition::default(),
        RequestKind::Other(_) => Disposition::default(),
    }
}

// =============================================================================
// Tests
// =============================================================================
