//! Error types for milter operations.

use std::io;

/// Result type alias for milter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Milter error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while writing to the MTA.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A header index does not fit the protocol's 4-byte index field.
    #[error("header index {index} does not fit the 4-byte wire field")]
    IndexTooLarge {
        /// The index that was requested.
        index: usize,
    },

    /// A payload is too large to be length-prefixed.
    #[error("packet payload of {0} bytes exceeds the 4-byte length field")]
    PacketTooLarge(usize),
}

impl Error {
    /// Returns true if this error means the connection to the MTA is unusable.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
