//! Connection management: packet transport and per-connection session state.

mod session;
mod stream;

pub use session::Session;
#[cfg(unix)]
pub use stream::connect_unix;
pub use stream::{PacketStream, connect};
