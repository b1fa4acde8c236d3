//! Per-connection milter session context.

use crate::error::Result;
use crate::modifier::Modifier;
use crate::protocol::{Packet, PacketSink};
use crate::types::{HeaderMap, Macros};

/// State accumulated over one MTA connection.
///
/// The session owns the macro map, the headers parsed so far, and the
/// transmit sink. It is the single writer of that context: the protocol
/// stage handlers update macros and headers between callbacks, and each
/// callback gets a [`Modifier`] borrowing the context for its own scope.
/// While a modifier exists the context cannot be mutated, which is exactly
/// the discipline the wire protocol requires.
#[derive(Debug)]
pub struct Session<S> {
    macros: Macros,
    headers: HeaderMap,
    sink: S,
}

impl<S: PacketSink> Session<S> {
    /// Creates a session over an established transmit sink.
    pub fn new(sink: S) -> Self {
        Self {
            macros: Macros::new(),
            headers: HeaderMap::new(),
            sink,
        }
    }

    /// Records a macro received from the MTA.
    pub fn set_macro(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.macros.insert(name.into(), value.into());
    }

    /// Drops all macros, as the MTA does between protocol stages.
    pub fn clear_macros(&mut self) {
        self.macros.clear();
    }

    /// Records a header received during the header stage.
    pub fn record_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.add(name, value);
    }

    /// Returns the current macros.
    #[must_use]
    pub const fn macros(&self) -> &Macros {
        &self.macros
    }

    /// Returns the headers parsed so far.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Builds the modifier for one callback invocation.
    ///
    /// Cheap and infallible; the modifier borrows this session's context and
    /// sink until it is dropped.
    pub fn modifier(&mut self) -> Modifier<'_, S> {
        Modifier::new(&self.macros, &self.headers, &mut self.sink)
    }

    /// Writes a raw protocol packet on this session's sink.
    ///
    /// # Errors
    ///
    /// Returns the sink's transport error if the packet cannot be written.
    pub async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.sink.write_packet(packet).await
    }

    /// Consumes the session and returns the transmit sink.
    pub fn into_sink(self) -> S {
        self.sink
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
    use super::*;

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

    #[tokio::test]
    async fn test_modifier_sees_session_context() {
        let mut session = Session::new(RecordingSink::default());
        session.set_macro("j", "mail.example.com");
        session.record_header("Subject", "Hello");
        session.record_header("Received", "from a");
        session.record_header("Received", "from b");

        let mut modifier = session.modifier();
        assert_eq!(modifier.macros().get("j").map(String::as_str), Some("mail.example.com"));
        assert_eq!(modifier.headers().count("Received"), 2);

        modifier.change_header(1, "Received", "rewritten").await.unwrap();

        let sink = session.into_sink();
        assert_eq!(sink.packets.len(), 1);
        assert_eq!(sink.packets[0].code, b'm');
    }

    #[tokio::test]
    async fn test_stage_updates_visible_to_next_modifier() {
        let mut session = Session::new(RecordingSink::default());
        session.set_macro("i", "queue-1");
        assert_eq!(session.modifier().macros().len(), 1);

        session.clear_macros();
        session.set_macro("i", "queue-2");
        session.record_header("X-Late", "v");

        let modifier = session.modifier();
        assert_eq!(modifier.macros().get("i").map(String::as_str), Some("queue-2"));
        assert_eq!(modifier.headers().get("x-late"), Some("v"));
    }
}
