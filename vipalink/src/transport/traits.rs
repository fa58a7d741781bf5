// vipalink-rs/vipalink/src/transport/traits.rs

use crate::Result;
use async_trait::async_trait;

/// Byte-stream access to a terminal port.
///
/// Implementations use interior mutability; the link serializes writes with
/// its own mutex, so a transport never sees interleaved packet bytes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write the whole buffer.
    async fn write_all(&self, bytes: &[u8]) -> Result<()>;

    /// Read up to `buf.len()` bytes, waiting at most `timeout_ms`.
    ///
    /// Returns [`crate::Error::Timeout`] when nothing arrives in time. The
    /// reader treats that as an idle port, not a fault.
    async fn read_chunk(&self, buf: &mut [u8], timeout_ms: u64) -> Result<usize>;

    /// Number of bytes waiting in the receive buffer.
    async fn bytes_to_read(&self) -> Result<usize>;

    /// Drop anything pending in both directions.
    async fn discard_buffers(&self) -> Result<()>;

    /// Whether the port is still usable.
    fn is_open(&self) -> bool;

    /// Close the port. Subsequent calls are no-ops.
    async fn close(&self) -> Result<()>;
}
