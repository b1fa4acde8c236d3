//! Low-level packet transport over a byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

use crate::error::Result;
use crate::protocol::{Packet, PacketSink};

/// Default write buffer capacity.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Packet-oriented writer over a byte stream.
///
/// Frames each packet (`<4-byte BE length><code><payload>`) into an internal
/// buffer and writes it to the stream as one contiguous write followed by a
/// flush, so that packets never interleave as long as callers serialize
/// their calls.
#[derive(Debug)]
pub struct PacketStream<S> {
    stream: S,
    write_buffer: BytesMut,
}

impl<S> PacketStream<S>
where
    S: AsyncWrite + Unpin,
{
    /// Wraps an existing stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Gets a reference to the underlying stream.
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Gets a mutable reference to the underlying stream.
    pub const fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consumes the packet stream and returns the inner stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Shuts down the write side of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

impl<S> PacketSink for PacketStream<S>
where
    S: AsyncWrite + Unpin,
{
    async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let frame = packet.to_bytes()?;
        tracing::trace!(
            code = %(packet.code as char),
            payload_len = packet.data.len(),
            "writing packet"
        );

        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(&frame);
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Connects to an MTA milter endpoint over TCP.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(hostname: &str, port: u16) -> Result<PacketStream<TcpStream>> {
    let addr = format!("{hostname}:{port}");
    let stream = TcpStream::connect(&addr).await?;
    Ok(PacketStream::new(stream))
}

/// Connects to an MTA milter endpoint over a unix domain socket.
///
/// # Errors
///
/// Returns an error if the connection fails.
#[cfg(unix)]
pub async fn connect_unix(path: &str) -> Result<PacketStream<UnixStream>> {
    let stream = UnixStream::connect(path).await?;
    Ok(PacketStream::new(stream))
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

    #[tokio::test]
    async fn test_write_packet_frames_once() {
        use tokio_test::io::Builder;

        let mock = Builder::new()
            .write(b"\x00\x00\x00\x06qheld\x00".as_slice())
            .build();
        let mut stream = PacketStream::new(mock);

        let packet = Packet::new(b'q', b"held\0".to_vec());
        stream.write_packet(&packet).await.unwrap();
    }

    #[tokio::test]
    async fn test_consecutive_packets_do_not_interleave() {
        use tokio_test::io::Builder;

        let mock = Builder::new()
            .write(b"\x00\x00\x00\x0b+<a@b.com>\x00".as_slice())
            .write(b"\x00\x00\x00\x04ba\nb".as_slice())
            .build();
        let mut stream = PacketStream::new(mock);

        stream
            .write_packet(&Packet::new(b'+', b"<a@b.com>\0".to_vec()))
            .await
            .unwrap();
        stream
            .write_packet(&Packet::new(b'b', b"a\nb".to_vec()))
            .await
            .unwrap();
    }
}
