//! Decoder for the length-prefixed binary request wire format.
//!
//! Channel request payloads carry big-endian, length-prefixed fields in the
//! RFC 4254 style: a `u32` is four bytes, a string is a `u32` length followed
//! by that many bytes. All decoders are total: malformed input yields `None`,
//! never a panic or an out-of-bounds read.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::U32_WIRE_LEN;
use crate::protocol::TermSize;

/// Decode a big-endian u32 from the front of `input`.
///
/// Returns the value and the remaining bytes, or `None` if fewer than four
/// bytes are available.
pub fn decode_u32(input: &[u8]) -> Option<(u32, &[u8])> {
    let raw: [u8; U32_WIRE_LEN] = input.get(..U32_WIRE_LEN)?.try_into().ok()?;
    Some((u32::from_be_bytes(raw), &input[U32_WIRE_LEN..]))
}

/// Decode a length-prefixed string from the front of `input`.
///
/// Returns the string bytes and the remaining bytes. Fails if the length
/// prefix is truncated or the declared length exceeds what is present; the
/// declared length is never used to index past the input.
pub fn decode_string(input: &[u8]) -> Option<(&[u8], &[u8])> {
    let (len, rest) = decode_u32(input)?;
    let len = len as usize;
    if rest.len() < len {
        return None;
    }
    Some(rest.split_at(len))
}

/// Decode the size carried by a `pty-req` payload.
///
/// The payload layout (RFC 4254 §6.2) is: terminal-type string, width, height,
/// pixel-width, pixel-height, encoded modes. Only the first three fields are
/// consumed; trailing fields are ignored. Fails on any truncated field or if
/// either dimension is zero.
pub fn decode_pty_request(payload: &[u8]) -> Option<TermSize> {
    let (_term_type, rest) = decode_string(payload)?;
    let (width, rest) = decode_u32(rest)?;
    let (height, _rest) = decode_u32(rest)?;
    TermSize::new(width, height)
}

/// Append a big-endian u32 to `buf`.
pub fn put_u32(buf: &mut BytesMut, value: u32) {
    buf.put_u32(value);
}

/// Append a length-prefixed string to `buf`.
pub fn put_string(buf: &mut BytesMut, value: &[u8]) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value);
}

/// Build a full `pty-req` payload, including the pixel-dimension and modes
/// fields the decoder skips.
pub fn encode_pty_request(term_type: &str, size: TermSize) -> Bytes {
    let mut buf = BytesMut::new();
    put_string(&mut buf, term_type.as_bytes());
    put_u32(&mut buf, size.width);
    put_u32(&mut buf, size.height);
    put_u32(&mut buf, 0); // pixel width
    put_u32(&mut buf, 0); // pixel height
    put_string(&mut buf, b"");
    buf.freeze()
}

/// Build an `exec` payload carrying one command string.
pub fn encode_exec_request(command: &str) -> Bytes {
    let mut buf = BytesMut::new();
    put_string(&mut buf, command.as_bytes());
    buf.freeze()
}

// =============================================================================
// Tests
// =============================================================================
