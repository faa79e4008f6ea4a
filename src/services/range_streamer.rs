use futures::{stream, StreamExt};
use std::{io, sync::Arc};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::{
    domain::{
        errors::StorageResult,
        models::{ByteRange, ByteStream, ContentStatus},
        value_objects::UserId,
    },
    ports::services::FileStorage,
};

/// Size of each ranged read issued against the store
pub const RANGE_CHUNK_SIZE: u64 = 16 * 1024;

/// The peer went away; stop writing without reporting an error
pub(crate) fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
    )
}

/// A whole or partial read of one file, ready to be streamed
pub struct RangeResponse {
    pub status: ContentStatus,
    /// Served range; `None` for a full read of an empty file
    pub range: Option<ByteRange>,
    pub total_length: u64,
    body: ByteStream,
}

impl RangeResponse {
    pub fn content_length(&self) -> u64 {
        self.range.map(|range| range.len()).unwrap_or(0)
    }

    /// `Content-Range` value for partial responses
    pub fn content_range(&self) -> Option<String> {
        match (self.status, self.range) {
            (ContentStatus::Partial, Some(range)) => Some(range.content_range(self.total_length)),
            _ => None,
        }
    }

    pub fn into_body(self) -> ByteStream {
        self.body
    }

    /// Copy the body into `writer`, returning the bytes delivered.
    ///
    /// A client disconnect ends the copy early and is not an error.
    pub async fn write_to<W>(self, writer: &mut W) -> StorageResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut body = self.body;
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            match writer.write_all(&chunk).await {
                Ok(()) => written += chunk.len() as u64,
                Err(e) if is_disconnect(&e) => {
                    debug!("Client disconnected after {} bytes", written);
                    return Ok(written);
                }
                Err(e) => return Err(e.into()),
            }
        }

        match writer.flush().await {
            Err(e) if !is_disconnect(&e) => Err(e.into()),
            _ => Ok(written),
        }
    }
}

/// Serves byte ranges of stored files in bounded chunks
#[derive(Clone)]
pub struct RangeStreamer {
    storage: Arc<dyn FileStorage>,
}

impl RangeStreamer {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Open `path` for reading, either whole or the given inclusive range
    pub async fn open(
        &self,
        user: UserId,
        path: &str,
        range: Option<ByteRange>,
    ) -> StorageResult<RangeResponse> {
        let total = self.storage.object_length(user, path).await?;
        self.open_sized(user, path, range, total).await
    }

    /// Open `path` according to an optional `Range` header value
    pub async fn open_with_header(
        &self,
        user: UserId,
        path: &str,
        header: Option<&str>,
    ) -> StorageResult<RangeResponse> {
        let total = self.storage.object_length(user, path).await?;
        let range = match header {
            Some(value) => ByteRange::from_header(value, total)?,
            None => None,
        };
        self.open_sized(user, path, range, total).await
    }

    async fn open_sized(
        &self,
        user: UserId,
        path: &str,
        range: Option<ByteRange>,
        total: u64,
    ) -> StorageResult<RangeResponse> {
        match range {
            Some(range) => {
                let range = range.fit_to(total)?;
                debug!(
                    "Stream {} of '{}' for user {}",
                    range.content_range(total),
                    path,
                    user
                );
                Ok(RangeResponse {
                    status: ContentStatus::Partial,
                    range: Some(range),
                    total_length: total,
                    body: self.chunked(user, path, range),
                })
            }
            None => {
                let handle = self.storage.get_object(user, path).await?;
                Ok(RangeResponse {
                    status: ContentStatus::Full,
                    range: (total > 0).then(|| ByteRange::new(0, total - 1)),
                    total_length: total,
                    body: handle.into_stream(),
                })
            }
        }
    }

    /// One ranged read per chunk, issued only when the previous chunk is consumed
    fn chunked(&self, user: UserId, path: &str, range: ByteRange) -> ByteStream {
        let storage = self.storage.clone();
        let path = path.to_string();

        stream::try_unfold(range.start, move |current| {
            let storage = storage.clone();
            let path = path.clone();
            async move {
                if current > range.end {
                    return Ok(None);
                }
                let length = RANGE_CHUNK_SIZE.min(range.end - current + 1);
                storage
                    .get_range_of_object(user, &path, current, length)
                    .await
                    .map(|chunk| Some((chunk, current + length)))
            }
        })
        .boxed()
    }
}
