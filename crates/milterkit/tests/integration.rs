//! Integration tests for the outbound modification path.
//!
//! These tests use a mock stream to capture the exact bytes a sequence of
//! modifications puts on the wire, without a real MTA connection.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use milterkit::{PacketStream, Session};

/// Mock stream that captures everything written to it.
#[derive(Default)]
struct MockStream {
    /// Captured bytes sent by the filter.
    sent: Vec<u8>,
}

impl MockStream {
    fn sent_data(&self) -> &[u8] {
        &self.sent
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        // The outbound path never reads.
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn modification_sequence_produces_exact_wire_bytes() {
    let stream = PacketStream::new(MockStream::default());
    let mut session = Session::new(stream);

    session.set_macro("j", "mail.example.com");
    session.record_header("Received", "from relay-a");
    session.record_header("Received", "from relay-b");
    session.record_header("Subject", "Hello");

    let mut modifier = session.modifier();
    assert_eq!(modifier.headers().count("Received"), 2);

    modifier.add_recipient("a@b.com").await.unwrap();
    modifier.change_header(1, "Received", "rewritten\r\nline").await.unwrap();
    modifier.replace_body(b"body line 1\r\nbody line 2\r\n").await.unwrap();
    modifier.change_sender("<new@example.com>").await.unwrap();

    let mut expected = Vec::new();
    // add_recipient: len 11 = '+' + "<a@b.com>\0"
    expected.extend_from_slice(b"\x00\x00\x00\x0b+<a@b.com>\x00");
    // change_header: len 1 + 4 + "Received\0" + "rewritten\nline\0"
    expected.extend_from_slice(b"\x00\x00\x00\x1dm\x00\x00\x00\x01Received\x00rewritten\nline\x00");
    // replace_body: len 1 + 24 normalized body bytes, no terminator
    expected.extend_from_slice(b"\x00\x00\x00\x19bbody line 1\nbody line 2\n");
    // change_sender: len 1 + "<new@example.com>\0"
    expected.extend_from_slice(b"\x00\x00\x00\x13e<new@example.com>\x00");

    let stream = session.into_sink();
    assert_eq!(stream.get_ref().sent_data(), expected.as_slice());
}

#[tokio::test]
async fn quarantine_round_trips_through_tcp_style_stream() {
    let stream = PacketStream::new(MockStream::default());
    let mut session = Session::new(stream);

    session.modifier().quarantine("looks like spam").await.unwrap();
    session.modifier().add_header("X-Quarantine", "yes").await.unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(b"\x00\x00\x00\x11qlooks like spam\x00");
    expected.extend_from_slice(b"\x00\x00\x00\x12hX-Quarantine\x00yes\x00");

    let stream = session.into_sink();
    assert_eq!(stream.get_ref().sent_data(), expected.as_slice());
}
