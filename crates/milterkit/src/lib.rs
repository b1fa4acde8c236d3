//! # milterkit
//!
//! A sendmail-milter protocol library for writing mail filters in Rust,
//! focused on the outbound side: encoding message modifications and
//! transmitting them to the MTA as correctly framed binary packets.
//!
//! ## Features
//!
//! - **Byte-exact action encoding**: NUL-terminated fields, big-endian
//!   header indexes, and LF-normalized text, exactly as the MTA's parser
//!   expects them
//! - **Capability-style modifier**: one [`Modifier`] per callback invocation,
//!   borrowing the session's macros, headers, and transmit sink
//! - **Injectable transport**: the [`PacketSink`] trait decouples encoding
//!   from sockets and is the natural seam for testing
//! - **TCP and unix-socket transports** via tokio
//!
//! ## Quick Start
//!
//! ```ignore
//! use milterkit::{Session, connect};
//!
//! #[tokio::main]
//! async fn main() -> milterkit::Result<()> {
//!     let stream = connect("127.0.0.1", 8892).await?;
//!     let mut session = Session::new(stream);
//!
//!     // ... protocol stages record macros and headers ...
//!     session.set_macro("j", "mail.example.com");
//!     session.record_header("Subject", "Hello");
//!
//!     // Inside a callback, take a modifier and apply decisions.
//!     let mut modifier = session.modifier();
//!     modifier.add_header("X-Filtered", "yes").await?;
//!     modifier.quarantine("suspicious attachment").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`action`]: modification actions and their payload encoding
//! - [`connection`]: packet transport and per-connection session state
//! - [`modifier`]: the capability set handed to filter callbacks
//! - [`protocol`]: packet framing and the transmit seam
//! - [`types`]: session-context types (macros, headers)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod action;
pub mod connection;
mod error;
pub mod modifier;
pub mod protocol;
pub mod types;

pub use action::{Action, ActionCode};
pub use connection::{PacketStream, Session, connect};
#[cfg(unix)]
pub use connection::connect_unix;
pub use error::{Error, Result};
pub use modifier::Modifier;
pub use protocol::{Packet, PacketSink, normalize_crlf};
pub use types::{HeaderMap, Macros};

/// Milter protocol version spoken on the wire.
pub const PROTOCOL_VERSION: u32 = 2;
