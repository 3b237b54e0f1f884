use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound for a single read from the connection.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Issues bounded reads against a raw connection.
///
/// The reader keeps no bytes between calls; anything a parse phase does not
/// consume is held by the parser that asked for the chunk.
pub struct ByteStreamReader<R> {
    inner: R,
    chunk_size: usize,
}

impl<R: AsyncRead + Unpin> ByteStreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Reads at most `chunk_size` bytes.
    ///
    /// Returns `Ok(None)` once the peer has closed its side.
    pub async fn read_chunk(&mut self) -> std::io::Result<Option<Bytes>> {
        let mut buf = BytesMut::zeroed(self.chunk_size);
        let n = self.inner.read(&mut buf).await?;

        if n == 0 {
            return Ok(None);
        }

        buf.truncate(n);
        Ok(Some(buf.freeze()))
    }
}
