//! Milter wire protocol primitives.
//!
//! Every milter protocol message is a framed packet: a 4-byte big-endian
//! length, one command/action code byte, then the payload. The length counts
//! the code byte plus the payload.

mod normalize;

pub use normalize::normalize_crlf;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Largest payload that still fits the 4-byte length field (which also
/// counts the code byte).
pub const MAX_PAYLOAD_SIZE: usize = (u32::MAX - 1) as usize;

/// One framed milter protocol message.
///
/// A packet is transient: it is built, written, and dropped. It carries no
/// framing itself; [`Packet::to_bytes`] produces the on-wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Command or action code byte.
    pub code: u8,
    /// Payload bytes, already encoded per the code's layout.
    pub data: Vec<u8>,
}

impl Packet {
    /// Creates a new packet.
    #[must_use]
    pub fn new(code: u8, data: Vec<u8>) -> Self {
        Self { code, data }
    }

    /// Encodes the packet into its on-wire form:
    /// `<4-byte BE length><code><data>` with `length = data.len() + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PacketTooLarge`] if the payload cannot be
    /// length-prefixed.
    pub fn to_bytes(&self) -> Result<Bytes> {
        if self.data.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PacketTooLarge(self.data.len()));
        }
        #[allow(clippy::cast_possible_truncation)]
        let length = (self.data.len() + 1) as u32;

        let mut buf = BytesMut::with_capacity(4 + 1 + self.data.len());
        buf.put_u32(length);
        buf.put_u8(self.code);
        buf.put_slice(&self.data);
        Ok(buf.freeze())
    }
}

/// Capability for transmitting one framed packet to the MTA.
///
/// The encoder layer depends only on this trait for I/O; the connection layer
/// implements it over a socket, and tests substitute a recording sink.
/// Implementations must write each packet contiguously: interleaving partial
/// writes of two packets desynchronizes the remote parser.
#[allow(async_fn_in_trait)]
pub trait PacketSink {
    /// Frames and writes one packet, returning once the write is submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet cannot be encoded or written.
    async fn write_packet(&mut self, packet: &Packet) -> Result<()>;
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

    #[test]
    fn test_packet_framing() {
        let packet = Packet::new(b'h', b"X-Test\0ok\0".to_vec());
        let bytes = packet.to_bytes().unwrap();
        // length = 10 payload bytes + 1 code byte
        assert_eq!(&bytes[..4], &[0, 0, 0, 11]);
        assert_eq!(bytes[4], b'h');
        assert_eq!(&bytes[5..], b"X-Test\0ok\0".as_slice());
    }

    #[test]
    fn test_packet_empty_payload() {
        let packet = Packet::new(b'q', Vec::new());
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(bytes.as_ref(), &[0, 0, 0, 1, b'q']);
    }
}
