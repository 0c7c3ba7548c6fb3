//! Protocol module for the session channel sub-protocol.
//!
//! This module provides:
//! - Channel request and terminal size types
//! - Length-prefixed big-endian field decoding
//! - Accept/reject dispatch rules per request kind

mod codec;
mod dispatch;
mod request;

#[cfg(test)]
mod proptest;

pub use codec::{
    decode_pty_request, decode_string, decode_u32, encode_exec_request, encode_pty_request,
    put_string, put_u32,
};
pub use dispatch::{Disposition, ReplyMode, dispatch};
pub use request::{ChannelRequest, RequestKind, TermSize};
