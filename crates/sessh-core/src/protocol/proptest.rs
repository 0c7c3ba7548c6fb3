//! Property-based tests for the request codec and dispatcher.
//!
//! These tests use proptest to verify:
//! - Decoders are total over arbitrary input
//! - Encoded fields round-trip through the decoders
//! - Dispatch rules hold for every payload, not just the handwritten cases

#![cfg(test)]

use bytes::BytesMut;
use proptest::collection::vec;
use proptest::prelude::*;

use crate::protocol::{
    ChannelRequest, TermSize, decode_pty_request, decode_string, decode_u32, dispatch,
    encode_exec_request, encode_pty_request, put_string, put_u32,
};

// =============================================================================
// Generators
// =============================================================================

prop_compose! {
    fn arb_term_size()(
        width in 1u32..=4096,
        height in 1u32..=4096,
    ) -> TermSize {
        TermSize { width, height }
    }
}

// =============================================================================
// Codec Properties
// =============================================================================

proptest! {
    #[test]
    fn decoders_never_panic(input in vec(any::<u8>(), 0..64)) {
        let _ = decode_u32(&input);
        let _ = decode_string(&input);
        let _ = decode_pty_request(&input);
    }

    #[test]
    fn u32_round_trips(value in any::<u32>(), tail in vec(any::<u8>(), 0..16)) {
        let mut buf = BytesMut::new();
        put_u32(&mut buf, value);
        buf.extend_from_slice(&tail);

        let (decoded, rest) = decode_u32(&buf).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(rest, &tail[..]);
    }

    #[test]
    fn string_round_trips(value in vec(any::<u8>(), 0..48), tail in vec(any::<u8>(), 0..16)) {
        let mut buf = BytesMut::new();
        put_string(&mut buf, &value);
        buf.extend_from_slice(&tail);

        let (decoded, rest) = decode_string(&buf).unwrap();
        prop_assert_eq!(decoded, &value[..]);
        prop_assert_eq!(rest, &tail[..]);
    }

    #[test]
    fn pty_request_round_trips(size in arb_term_size(), term in "[a-z0-9-]{0,16}") {
        let payload = encode_pty_request(&term, size);
        prop_assert_eq!(decode_pty_request(&payload), Some(size));
    }

    #[test]
    fn truncated_pty_request_fails_cleanly(
        size in arb_term_size(),
        term in "[a-z0-9-]{0,12}",
        cut in 0usize..64,
    ) {
        // Minimal payload: terminal type, width, height, nothing after.
        let mut buf = BytesMut::new();
        put_string(&mut buf, term.as_bytes());
        put_u32(&mut buf, size.width);
        put_u32(&mut buf, size.height);

        prop_assume!(cut < buf.len());
        prop_assert_eq!(decode_pty_request(&buf[..cut]), None);
    }
}

// =============================================================================
// Dispatch Properties
// =============================================================================

proptest! {
    #[test]
    fn env_accepts_any_payload(payload in vec(any::<u8>(), 0..32)) {
        prop_assert!(dispatch(&ChannelRequest::new("env", true, payload)).accept);
    }

    #[test]
    fn forwarding_refused_for_any_payload(payload in vec(any::<u8>(), 0..32)) {
        for name in ["x11-req", "auth-agent-req@openssh.com"] {
            let disp = dispatch(&ChannelRequest::new(name, true, payload.clone()));
            prop_assert!(!disp.accept);
            prop_assert!(!disp.terminate);
        }
    }

    #[test]
    fn exec_terminates_for_any_payload(payload in vec(any::<u8>(), 0..32)) {
        let well_formed = decode_string(&payload).is_some();
        let disp = dispatch(&ChannelRequest::new("exec", false, payload));

        prop_assert!(disp.terminate);
        prop_assert!(disp.must_reply(false));
        prop_assert_eq!(disp.accept, well_formed);
        prop_assert_eq!(disp.line.is_some(), well_formed);
    }

    #[test]
    fn exec_surfaces_exactly_the_command(command in "[ -~]{0,32}") {
        let disp = dispatch(&ChannelRequest::new("exec", true, encode_exec_request(&command)));
        prop_assert_eq!(disp.line.as_deref(), Some(command.as_str()));
    }

    #[test]
    fn shell_accept_tracks_payload_emptiness(payload in vec(any::<u8>(), 0..8)) {
        let disp = dispatch(&ChannelRequest::new("shell", true, payload.clone()));
        prop_assert_eq!(disp.accept, payload.is_empty());
    }
}
