//! Line editor running over a session channel.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::ChannelRequest;
use crate::transport::{ChannelEvent, SessionChannel};

/// One item produced by [`LineEditor::read_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    /// A completed line of input, without its terminator.
    Line(String),
    /// An out-of-band request that arrived while reading.
    Request(ChannelRequest),
}

/// Outcome of feeding one input byte to the editor.
enum Feed {
    Incomplete,
    Line(String),
    Eof,
}

/// Escape sequence parser state. Arrow keys and similar send multi-byte
/// sequences that must not end up inside the line buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    Ground,
    Escape,
    Csi,
}

/// Minimal line discipline over a [`SessionChannel`].
///
/// Writes a prompt, echoes printable input, handles backspace, kill-line,
/// interrupt, and CSI escape swallowing, and yields completed lines. The
/// line buffer grows with input until a terminator arrives; bounding a
/// hostile peer's input is left to the transport.
///
/// Not reentrant: exactly one task may be inside
/// [`read_event`](LineEditor::read_event) at a time, which `&mut self`
/// already enforces.
pub struct LineEditor<C> {
    channel: C,
    prompt: Bytes,
    line: Vec<u8>,
    pending: VecDeque<u8>,
    echo: Vec<u8>,
    esc: EscapeState,
    cr_pending: bool,
    need_prompt: bool,
}

impl<C: SessionChannel> LineEditor<C> {
    /// Create an editor owning `channel`, prompting with `prompt`.
    pub fn new(channel: C, prompt: &str) -> Self {
        Self {
            channel,
            prompt: Bytes::copy_from_slice(prompt.as_bytes()),
            line: Vec::new(),
            pending: VecDeque::new(),
            echo: Vec::new(),
            esc: EscapeState::Ground,
            cr_pending: false,
            need_prompt: true,
        }
    }

    /// Read the next line or out-of-band request.
    ///
    /// Data and requests are surfaced in the order the channel delivers
    /// them. A request arriving mid-line leaves the partial line intact;
    /// editing resumes afterwards. Returns
    /// [`Error::ConnectionClosed`] when the peer ends the stream, including
    /// via an EOF control byte on an empty line.
    pub async fn read_event(&mut self) -> Result<TermEvent> {
        loop {
            if self.need_prompt {
                self.echo.extend_from_slice(&self.prompt);
                self.need_prompt = false;
            }

            while let Some(byte) = self.pending.pop_front() {
                match self.feed(byte) {
                    Feed::Incomplete => {}
                    Feed::Line(line) => {
                        self.need_prompt = true;
                        self.flush_echo().await?;
                        return Ok(TermEvent::Line(line));
                    }
                    Feed::Eof => {
                        self.flush_echo().await?;
                        return Err(Error::ConnectionClosed);
                    }
                }
            }

            self.flush_echo().await?;
            match self.channel.read_event().await? {
                ChannelEvent::Data(data) => self.pending.extend(data.iter().copied()),
                ChannelEvent::Request(req) => return Ok(TermEvent::Request(req)),
            }
        }
    }

    /// Write output bytes to the peer, after any queued echo.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.flush_echo().await?;
        self.channel.write(data).await
    }

    /// Access the underlying channel, e.g. to acknowledge a request.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Close the underlying channel.
    pub fn close(&mut self) {
        self.channel.close();
    }

    async fn flush_echo(&mut self) -> Result<()> {
        if self.echo.is_empty() {
            return Ok(());
        }
        let out = std::mem::take(&mut self.echo);
        self.channel.write(&out).await
    }

    fn feed(&mut self, byte: u8) -> Feed {
        if self.cr_pending {
            self.cr_pending = false;
            if byte == b'\n' {
                return Feed::Incomplete;
            }
        }

        match self.esc {
            EscapeState::Escape => {
                self.esc = if byte == b'[' {
                    EscapeState::Csi
                } else {
                    EscapeState::Ground
                };
                return Feed::Incomplete;
            }
            EscapeState::Csi => {
                // Final bytes of a CSI sequence are 0x40..=0x7e.
                if (0x40..=0x7e).contains(&byte) {
                    self.esc = EscapeState::Ground;
                }
                return Feed::Incomplete;
            }
            EscapeState::Ground => {}
        }

        match byte {
            b'\r' => {
                self.cr_pending = true;
                Feed::Line(self.take_line())
            }
            b'\n' => Feed::Line(self.take_line()),
            0x1b => {
                self.esc = EscapeState::Escape;
                Feed::Incomplete
            }
            0x7f | 0x08 => {
                self.erase_last_char();
                Feed::Incomplete
            }
            0x15 => {
                self.kill_line();
                Feed::Incomplete
            }
            0x03 => {
                self.line.clear();
                self.echo.extend_from_slice(b"^C\r\n");
                self.echo.extend_from_slice(&self.prompt);
                Feed::Incomplete
            }
            0x04 => {
                if self.line.is_empty() {
                    Feed::Eof
                } else {
                    Feed::Incomplete
                }
            }
            0x20..=0x7e | 0x80.. => {
                self.line.push(byte);
                self.echo.push(byte);
                Feed::Incomplete
            }
            _ => Feed::Incomplete,
        }
    }

    fn take_line(&mut self) -> String {
        self.echo.extend_from_slice(b"\r\n");
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();
        line
    }

    /// Remove the last character (not byte) from the line buffer.
    fn erase_last_char(&mut self) {
        if self.line.is_empty() {
            return;
        }
        while let Some(byte) = self.line.pop() {
            // Continuation bytes are 0b10xxxxxx; stop once a leading byte
            // has been removed.
            if byte & 0xc0 != 0x80 {
                break;
            }
        }
        self.echo.extend_from_slice(b"\x08 \x08");
    }

    fn kill_line(&mut self) {
        let chars = self.line.iter().filter(|b| **b & 0xc0 != 0x80).count();
        for _ in 0..chars {
            self.echo.extend_from_slice(b"\x08 \x08");
        }
        self.line.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::future::Future;

    use tokio::sync::mpsc;

    use super::*;
    use crate::protocol::RequestKind;

    struct TestChannel {
        events: mpsc::UnboundedReceiver<ChannelEvent>,
        out: mpsc::UnboundedSender<Vec<u8>>,
        closed: bool,
    }

    impl SessionChannel for TestChannel {
        fn read_event(&mut self) -> impl Future<Output = Result<ChannelEvent>> + Send {
            async move { self.events.recv().await.ok_or(Error::ConnectionClosed) }
        }

        fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
            let sent = self
                .out
                .send(data.to_vec())
                .map_err(|_| Error::ConnectionClosed);
            async move { sent }
        }

        fn ack_request(&mut self, _accepted: bool) -> impl Future<Output = Result<()>> + Send {
            async move { Ok(()) }
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    struct Harness {
        editor: LineEditor<TestChannel>,
        input: mpsc::UnboundedSender<ChannelEvent>,
        output: mpsc::UnboundedReceiver<Vec<u8>>,
    }

    fn harness() -> Harness {
        let (input, events) = mpsc::unbounded_channel();
        let (out, output) = mpsc::unbounded_channel();
        let channel = TestChannel {
            events,
            out,
            closed: false,
        };
        Harness {
            editor: LineEditor::new(channel, "> "),
            input,
            output,
        }
    }

    impl Harness {
        fn send(&self, bytes: &[u8]) {
            self.input
                .send(ChannelEvent::Data(Bytes::copy_from_slice(bytes)))
                .unwrap();
        }

        fn send_request(&self, name: &str) {
            self.input
                .send(ChannelEvent::Request(ChannelRequest::new(
                    name,
                    true,
                    &[][..],
                )))
                .unwrap();
        }

        fn drain_output(&mut self) -> Vec<u8> {
            let mut all = Vec::new();
            while let Ok(chunk) = self.output.try_recv() {
                all.extend_from_slice(&chunk);
            }
            all
        }
    }

    #[tokio::test]
    async fn completes_line_on_carriage_return() {
        let mut h = harness();
        h.send(b"hello\r");
        let event = h.editor.read_event().await.unwrap();
        assert_eq!(event, TermEvent::Line("hello".to_string()));

        let out = h.drain_output();
        assert!(out.starts_with(b"> "), "prompt first: {out:?}");
        assert!(out.ends_with(b"hello\r\n"), "echo with newline: {out:?}");
    }

    #[tokio::test]
    async fn assembles_line_from_multiple_chunks() {
        let mut h = harness();
        h.send(b"he");
        h.send(b"llo\r");
        let event = h.editor.read_event().await.unwrap();
        assert_eq!(event, TermEvent::Line("hello".to_string()));
    }

    #[tokio::test]
    async fn splits_multiple_lines_in_one_chunk() {
        let mut h = harness();
        h.send(b"one\rtwo\r");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("one".to_string())
        );
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("two".to_string())
        );
    }

    #[tokio::test]
    async fn crlf_is_one_terminator() {
        let mut h = harness();
        h.send(b"ls\r\npwd\r");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("ls".to_string())
        );
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("pwd".to_string())
        );
    }

    #[tokio::test]
    async fn bare_newline_terminates_too() {
        let mut h = harness();
        h.send(b"quit\n");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("quit".to_string())
        );
    }

    #[tokio::test]
    async fn backspace_removes_last_character() {
        let mut h = harness();
        h.send(b"lsx\x7f\r");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("ls".to_string())
        );
        let out = h.drain_output();
        assert!(
            out.windows(3).any(|w| w == b"\x08 \x08"),
            "erase echo missing: {out:?}"
        );
    }

    #[tokio::test]
    async fn backspace_removes_whole_utf8_character() {
        let mut h = harness();
        let mut bytes = "é".as_bytes().to_vec();
        bytes.extend_from_slice(b"\x7f!\r");
        h.send(&bytes);
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("!".to_string())
        );
    }

    #[tokio::test]
    async fn kill_line_discards_pending_input() {
        let mut h = harness();
        h.send(b"abc\x15ok\r");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("ok".to_string())
        );
    }

    #[tokio::test]
    async fn interrupt_cancels_current_line() {
        let mut h = harness();
        h.send(b"abc\x03ok\r");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("ok".to_string())
        );
        let out = h.drain_output();
        assert!(
            out.windows(2).any(|w| w == b"^C"),
            "interrupt echo missing: {out:?}"
        );
    }

    #[tokio::test]
    async fn escape_sequences_stay_out_of_the_line() {
        let mut h = harness();
        // Up arrow (CSI A) in the middle of typing.
        h.send(b"l\x1b[As\r");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("ls".to_string())
        );
    }

    #[tokio::test]
    async fn utf8_input_survives_intact() {
        let mut h = harness();
        let mut bytes = "héllo wörld".as_bytes().to_vec();
        bytes.push(b'\r');
        h.send(&bytes);
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("héllo wörld".to_string())
        );
    }

    #[tokio::test]
    async fn request_interleaves_without_losing_partial_line() {
        let mut h = harness();
        h.send(b"he");
        h.send_request("env");
        h.send(b"llo\r");

        match h.editor.read_event().await.unwrap() {
            TermEvent::Request(req) => assert_eq!(req.kind, RequestKind::Env),
            other => panic!("expected request, got {other:?}"),
        }
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("hello".to_string())
        );

        // The prompt must not repeat for the resumed line.
        let out = h.drain_output();
        let prompts = out.windows(2).filter(|w| *w == b"> ").count();
        assert_eq!(prompts, 1, "output: {out:?}");
    }

    #[tokio::test]
    async fn eof_byte_on_empty_line_ends_session() {
        let mut h = harness();
        h.send(b"\x04");
        let err = h.editor.read_event().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn eof_byte_mid_line_is_ignored() {
        let mut h = harness();
        h.send(b"ab\x04c\r");
        assert_eq!(
            h.editor.read_event().await.unwrap(),
            TermEvent::Line("abc".to_string())
        );
    }

    #[tokio::test]
    async fn peer_hangup_surfaces_as_closed() {
        let mut h = harness();
        h.send(b"unfinished");
        drop(h.input);
        let err = h.editor.read_event().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn caller_output_reaches_the_peer() {
        let mut h = harness();
        h.send(b"x\r");
        h.editor.read_event().await.unwrap();
        h.drain_output();

        h.editor.write(b"output").await.unwrap();
        let out = h.drain_output();
        assert_eq!(out, b"output");
    }
}
