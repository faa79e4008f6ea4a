use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::domain::{errors::StorageResult, value_objects::LogicalPath};

/// Owned stream of object bytes
pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// An open (or lazily openable) read of one stored object.
///
/// The handle owns its stream; dropping it releases the backing connection.
pub struct FileHandle {
    path: LogicalPath,
    byte_length: u64,
    stream: ByteStream,
}

impl FileHandle {
    pub fn new(path: LogicalPath, byte_length: u64, stream: ByteStream) -> Self {
        Self {
            path,
            byte_length,
            stream,
        }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    pub fn stream_mut(&mut self) -> &mut ByteStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    /// Expose the content as an `AsyncRead`
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.stream.map_err(std::io::Error::other))
    }

    /// Read the whole object into memory
    pub async fn into_bytes(mut self) -> StorageResult<Bytes> {
        let mut buffer = BytesMut::with_capacity(self.byte_length.min(1 << 20) as usize);
        while let Some(chunk) = self.stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("byte_length", &self.byte_length)
            .finish_non_exhaustive()
    }
}
