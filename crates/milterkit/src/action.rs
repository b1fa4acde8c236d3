//! Message modification actions and their wire encoding.
//!
//! Each action the filter can take on a message maps to one action code byte
//! and a payload layout the MTA decodes without further framing hints, so the
//! encoding here must be byte-exact: every text field carries exactly one
//! trailing NUL, header indexes are 4-byte big-endian, and replacement bodies
//! carry no terminator at all (the packet length delimits them).

use crate::error::{Error, Result};
use crate::protocol::{Packet, normalize_crlf};

/// Action code byte sent to the MTA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActionCode {
    /// Add an envelope recipient.
    AddRecipient = b'+',
    /// Remove an envelope recipient.
    DeleteRecipient = b'-',
    /// Replace the message body.
    ReplaceBody = b'b',
    /// Append a message header.
    AddHeader = b'h',
    /// Replace a header at a per-name position.
    ChangeHeader = b'm',
    /// Insert a header at a per-name position.
    InsertHeader = b'i',
    /// Quarantine the message.
    Quarantine = b'q',
    /// Replace the envelope sender.
    ChangeSender = b'e',
}

impl ActionCode {
    /// Returns the raw code byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// One message modification, borrowed from the caller for the duration of a
/// single encode-and-transmit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Add an envelope recipient.
    AddRecipient {
        /// Recipient address, without angle brackets.
        address: &'a str,
    },
    /// Remove an envelope recipient.
    DeleteRecipient {
        /// Recipient address, without angle brackets.
        address: &'a str,
    },
    /// Replace the message body.
    ReplaceBody {
        /// Replacement body bytes.
        body: &'a [u8],
    },
    /// Append a message header.
    AddHeader {
        /// Header name.
        name: &'a str,
        /// Header value.
        value: &'a str,
    },
    /// Replace the header at a per-name position.
    ChangeHeader {
        /// Position among headers with this exact name.
        index: usize,
        /// Header name.
        name: &'a str,
        /// New header value.
        value: &'a str,
    },
    /// Insert a header at a per-name position.
    InsertHeader {
        /// Position among headers with this exact name.
        index: usize,
        /// Header name.
        name: &'a str,
        /// Header value.
        value: &'a str,
    },
    /// Quarantine the message.
    Quarantine {
        /// Reason for holding the message.
        reason: &'a str,
    },
    /// Replace the envelope sender.
    ChangeSender {
        /// New sender value.
        value: &'a str,
    },
}

impl Action<'_> {
    /// Returns the action code for this modification.
    #[must_use]
    pub const fn code(&self) -> ActionCode {
        match self {
            Self::AddRecipient { .. } => ActionCode::AddRecipient,
            Self::DeleteRecipient { .. } => ActionCode::DeleteRecipient,
            Self::ReplaceBody { .. } => ActionCode::ReplaceBody,
            Self::AddHeader { .. } => ActionCode::AddHeader,
            Self::ChangeHeader { .. } => ActionCode::ChangeHeader,
            Self::InsertHeader { .. } => ActionCode::InsertHeader,
            Self::Quarantine { .. } => ActionCode::Quarantine,
            Self::ChangeSender { .. } => ActionCode::ChangeSender,
        }
    }

    /// Encodes the action into a transmittable packet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexTooLarge`] if a header index does not fit the
    /// protocol's fixed 4-byte field.
    pub fn to_packet(&self) -> Result<Packet> {
        let mut data = Vec::new();

        match self {
            Self::AddRecipient { address } | Self::DeleteRecipient { address } => {
                data.push(b'<');
                data.extend_from_slice(address.as_bytes());
                data.push(b'>');
                data.push(0);
            }
            Self::ReplaceBody { body } => {
                // Not NUL-delimited; the packet length delimits the body.
                data.extend_from_slice(&normalize_crlf(body));
            }
            Self::AddHeader { name, value } => {
                write_field(&mut data, name.as_bytes());
                write_field(&mut data, &normalize_crlf(value.as_bytes()));
            }
            Self::ChangeHeader { index, name, value }
            | Self::InsertHeader { index, name, value } => {
                let index =
                    u32::try_from(*index).map_err(|_| Error::IndexTooLarge { index: *index })?;
                data.extend_from_slice(&index.to_be_bytes());
                write_field(&mut data, name.as_bytes());
                write_field(&mut data, &normalize_crlf(value.as_bytes()));
            }
            Self::Quarantine { reason } => {
                write_field(&mut data, reason.as_bytes());
            }
            Self::ChangeSender { value } => {
                write_field(&mut data, value.as_bytes());
            }
        }

        Ok(Packet::new(self.code().as_byte(), data))
    }
}

/// Appends one payload field followed by its single NUL terminator.
fn write_field(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(bytes);
    buf.push(0);
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
    fn test_add_recipient_payload() {
        let packet = Action::AddRecipient { address: "a@b.com" }.to_packet().unwrap();
        assert_eq!(packet.code, b'+');
        assert_eq!(packet.data, b"<a@b.com>\0");
    }

    #[test]
    fn test_delete_recipient_payload() {
        let packet = Action::DeleteRecipient { address: "a@b.com" }.to_packet().unwrap();
        assert_eq!(packet.code, b'-');
        assert_eq!(packet.data, b"<a@b.com>\0");
    }

    #[test]
    fn test_replace_body_has_no_terminator() {
        let packet = Action::ReplaceBody { body: b"a\r\nb" }.to_packet().unwrap();
        assert_eq!(packet.code, b'b');
        assert_eq!(packet.data, b"a\nb");
    }

    #[test]
    fn test_add_header_normalizes_value() {
        let packet = Action::AddHeader { name: "X-Test", value: "v\r\n1" }
            .to_packet()
            .unwrap();
        assert_eq!(packet.code, b'h');
        assert_eq!(packet.data, b"X-Test\0v\n1\0");
    }

    #[test]
    fn test_change_header_prefixes_big_endian_index() {
        let packet = Action::ChangeHeader { index: 2, name: "Received", value: "x" }
            .to_packet()
            .unwrap();
        assert_eq!(packet.code, b'm');
        assert_eq!(&packet.data[..4], &[0, 0, 0, 2]);
        assert_eq!(&packet.data[4..], b"Received\0x\0");
    }

    #[test]
    fn test_insert_header_layout() {
        let packet = Action::InsertHeader { index: 0, name: "X-First", value: "v" }
            .to_packet()
            .unwrap();
        assert_eq!(packet.code, b'i');
        assert_eq!(packet.data, b"\0\0\0\0X-First\0v\0");
    }

    #[test]
    fn test_quarantine_payload() {
        let packet = Action::Quarantine { reason: "spam" }.to_packet().unwrap();
        assert_eq!(packet.code, b'q');
        assert_eq!(packet.data, b"spam\0");
    }

    #[test]
    fn test_change_sender_payload() {
        let packet = Action::ChangeSender { value: "<new@example.com>" }
            .to_packet()
            .unwrap();
        assert_eq!(packet.code, b'e');
        assert_eq!(packet.data, b"<new@example.com>\0");
    }

    #[test]
    fn test_exactly_one_trailing_nul() {
        let cases = [
            Action::AddRecipient { address: "a@b.com" },
            Action::DeleteRecipient { address: "a@b.com" },
            Action::AddHeader { name: "X", value: "y" },
            Action::ChangeHeader { index: 1, name: "X", value: "y" },
            Action::InsertHeader { index: 1, name: "X", value: "y" },
            Action::Quarantine { reason: "held" },
            Action::ChangeSender { value: "s" },
        ];
        for action in cases {
            let data = action.to_packet().unwrap().data;
            assert_eq!(data.last(), Some(&0), "{action:?}");
            assert_ne!(data.get(data.len().wrapping_sub(2)), Some(&0), "{action:?}");
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_oversized_index_is_an_encoding_error() {
        let action = Action::ChangeHeader { index: usize::MAX, name: "X", value: "y" };
        assert!(matches!(
            action.to_packet(),
            Err(crate::Error::IndexTooLarge { index: usize::MAX })
        ));
    }
}
