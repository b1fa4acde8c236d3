//! Message modification interface handed to filter callbacks.

use crate::action::Action;
use crate::error::Result;
use crate::protocol::PacketSink;
use crate::types::{HeaderMap, Macros};

/// Capability set for modifying the message currently being filtered.
///
/// A `Modifier` is built once per callback invocation and borrows the
/// session's macros, parsed headers, and transmit sink for that scope. It
/// holds no state of its own: every write operation encodes one action,
/// hands the packet to the sink, and returns the sink's outcome unchanged.
/// Calls are additive protocol instructions — adding the same header twice
/// adds two headers.
///
/// Construction performs no I/O and cannot fail.
#[derive(Debug)]
pub struct Modifier<'s, S> {
    macros: &'s Macros,
    headers: &'s HeaderMap,
    sink: &'s mut S,
}

impl<'s, S: PacketSink> Modifier<'s, S> {
    /// Binds a modifier to one session's macros, headers, and transmit sink.
    pub fn new(macros: &'s Macros, headers: &'s HeaderMap, sink: &'s mut S) -> Self {
        Self { macros, headers, sink }
    }

    /// Appends a new envelope recipient for the current message.
    ///
    /// # Errors
    ///
    /// Returns the sink's transport error if the packet cannot be written.
    pub async fn add_recipient(&mut self, address: &str) -> Result<()> {
        self.submit(Action::AddRecipient { address }).await
    }

    /// Removes an envelope recipient address from the message.
    ///
    /// # Errors
    ///
    /// Returns the sink's transport error if the packet cannot be written.
    pub async fn delete_recipient(&mut self, address: &str) -> Result<()> {
        self.submit(Action::DeleteRecipient { address }).await
    }

    /// Substitutes the message body with the provided body.
    ///
    /// # Errors
    ///
    /// Returns the sink's transport error if the packet cannot be written.
    pub async fn replace_body(&mut self, body: &[u8]) -> Result<()> {
        self.submit(Action::ReplaceBody { body }).await
    }

    /// Appends a new header to the message.
    ///
    /// # Errors
    ///
    /// Returns the sink's transport error if the packet cannot be written.
    pub async fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.submit(Action::AddHeader { name, value }).await
    }

    /// Replaces the header at the specified position with a new one.
    ///
    /// The index is per name: index 2 for "Received" targets the third
    /// header literally named "Received".
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IndexTooLarge`] if the index does not fit the
    /// 4-byte wire field, or the sink's transport error.
    pub async fn change_header(&mut self, index: usize, name: &str, value: &str) -> Result<()> {
        self.submit(Action::ChangeHeader { index, name, value }).await
    }

    /// Inserts a header at the specified per-name position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IndexTooLarge`] if the index does not fit the
    /// 4-byte wire field, or the sink's transport error.
    pub async fn insert_header(&mut self, index: usize, name: &str, value: &str) -> Result<()> {
        self.submit(Action::InsertHeader { index, name, value }).await
    }

    /// Quarantines the message, giving a reason to hold it.
    ///
    /// # Errors
    ///
    /// Returns the sink's transport error if the packet cannot be written.
    pub async fn quarantine(&mut self, reason: &str) -> Result<()> {
        self.submit(Action::Quarantine { reason }).await
    }

    /// Replaces the envelope sender with a new value.
    ///
    /// # Errors
    ///
    /// Returns the sink's transport error if the packet cannot be written.
    pub async fn change_sender(&mut self, value: &str) -> Result<()> {
        self.submit(Action::ChangeSender { value }).await
    }

    /// Returns the macros the MTA supplied for the current stage.
    ///
    /// This is the live session view, not a copy.
    #[must_use]
    pub const fn macros(&self) -> &'s Macros {
        self.macros
    }

    /// Returns the headers parsed so far in the current message.
    ///
    /// This is the live session view, not a copy.
    #[must_use]
    pub const fn headers(&self) -> &'s HeaderMap {
        self.headers
    }

    async fn submit(&mut self, action: Action<'_>) -> Result<()> {
        let packet = action.to_packet()?;
        self.sink.write_packet(&packet).await
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use std::io;

    use crate::Error;
    use crate::protocol::Packet;

    use super::*;

    /// Sink that records every packet it is handed.
    #[derive(Default)]
    struct RecordingSink {
        packets: Vec<Packet>,
    }

    impl PacketSink for RecordingSink {
        async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
            self.packets.push(packet.clone());
            Ok(())
        }
    }

    /// Sink whose every write fails with a broken pipe.
    #[derive(Default)]
    struct FailingSink {
        attempts: usize,
    }

    impl PacketSink for FailingSink {
        async fn write_packet(&mut self, _packet: &Packet) -> Result<()> {
            self.attempts += 1;
            Err(Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")))
        }
    }

    #[tokio::test]
    async fn test_operations_submit_one_packet_each() {
        let macros = Macros::new();
        let headers = HeaderMap::new();
        let mut sink = RecordingSink::default();
        let mut modifier = Modifier::new(&macros, &headers, &mut sink);

        modifier.add_recipient("a@b.com").await.unwrap();
        modifier.delete_recipient("c@d.com").await.unwrap();
        modifier.replace_body(b"a\r\nb").await.unwrap();
        modifier.add_header("X-Test", "v\r\n1").await.unwrap();
        modifier.change_header(2, "Received", "x").await.unwrap();
        modifier.insert_header(0, "X-First", "v").await.unwrap();
        modifier.quarantine("spam").await.unwrap();
        modifier.change_sender("<s@t.com>").await.unwrap();

        let codes: Vec<u8> = sink.packets.iter().map(|p| p.code).collect();
        assert_eq!(codes, vec![b'+', b'-', b'b', b'h', b'm', b'i', b'q', b'e']);
        assert_eq!(sink.packets[0].data, b"<a@b.com>\0");
        assert_eq!(sink.packets[2].data, b"a\nb");
        assert_eq!(sink.packets[3].data, b"X-Test\0v\n1\0");
        assert_eq!(&sink.packets[4].data[..4], &[0, 0, 0, 2]);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_additive() {
        let macros = Macros::new();
        let headers = HeaderMap::new();
        let mut sink = RecordingSink::default();
        let mut modifier = Modifier::new(&macros, &headers, &mut sink);

        modifier.add_header("X-Seen", "1").await.unwrap();
        modifier.add_header("X-Seen", "1").await.unwrap();

        assert_eq!(sink.packets.len(), 2);
        assert_eq!(sink.packets[0], sink.packets[1]);
    }

    #[tokio::test]
    async fn test_sink_failure_propagates_unwrapped() {
        let macros = Macros::new();
        let headers = HeaderMap::new();
        let mut sink = FailingSink::default();
        let mut modifier = Modifier::new(&macros, &headers, &mut sink);

        let err = modifier.quarantine("held").await.unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert!(err.is_transport());
        assert_eq!(sink.attempts, 1);
    }

    #[tokio::test]
    async fn test_encoding_failure_never_reaches_sink() {
        let macros = Macros::new();
        let headers = HeaderMap::new();
        let mut sink = RecordingSink::default();
        let mut modifier = Modifier::new(&macros, &headers, &mut sink);

        #[cfg(target_pointer_width = "64")]
        {
            let err = modifier.change_header(usize::MAX, "X", "y").await.unwrap_err();
            assert!(matches!(err, Error::IndexTooLarge { .. }));
        }
        assert!(sink.packets.is_empty());
    }

    #[tokio::test]
    async fn test_accessors_return_live_session_context() {
        let mut macros = Macros::new();
        macros.insert("j".to_string(), "queue-id".to_string());
        let mut headers = HeaderMap::new();
        headers.add("Subject", "Hello");

        let mut sink = RecordingSink::default();
        {
            let modifier = Modifier::new(&macros, &headers, &mut sink);
            assert!(std::ptr::eq(modifier.macros(), &macros));
            assert!(std::ptr::eq(modifier.headers(), &headers));
            assert_eq!(modifier.headers().get("subject"), Some("Hello"));
        }

        // Session context mutated between callback invocations is visible to
        // the next modifier built over the same context.
        headers.add("Subject", "Re: Hello");
        let modifier = Modifier::new(&macros, &headers, &mut sink);
        assert_eq!(modifier.headers().count("Subject"), 2);
    }
}
