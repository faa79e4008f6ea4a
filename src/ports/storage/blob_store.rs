use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::ops::Range;

use crate::domain::{errors::StorageResult, models::ByteStream, value_objects::StorageKey};

/// Caller-supplied upload body
pub type UploadStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// Port for the flat backing object store.
///
/// Keys are plain strings; `/` has no meaning to the store beyond what
/// listings do with it. Prefixes are raw string prefixes.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store a small object held in memory
    async fn put_object(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<()>;

    /// Store an object from a stream, returning the number of bytes written.
    ///
    /// When `declared_length` is given and the stream yields a different
    /// number of bytes, the upload is aborted with a transfer error.
    async fn put_stream(
        &self,
        key: &StorageKey,
        data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<u64>;

    /// Open the whole object as a stream
    async fn get(&self, key: &StorageKey) -> StorageResult<BlobReader>;

    /// Read a half-open byte range of the object
    async fn get_range(&self, key: &StorageKey, range: Range<u64>) -> StorageResult<Bytes>;

    /// Metadata of one object, `None` when absent
    async fn head(&self, key: &StorageKey) -> StorageResult<Option<BlobInfo>>;

    /// List keys starting with `prefix`.
    ///
    /// Non-recursive listings stop at the next `/` after the prefix and report
    /// each such sub-prefix once as a zero-size key ending in `/`.
    async fn list(
        &self,
        prefix: &str,
        recursive: bool,
        max_keys: Option<usize>,
    ) -> StorageResult<Vec<BlobInfo>>;

    /// Remove one key; removing an absent key succeeds
    async fn remove(&self, key: &StorageKey) -> StorageResult<()>;

    /// Server-side copy of one object
    async fn copy(&self, source: &StorageKey, destination: &StorageKey) -> StorageResult<()>;
}

/// One listed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    pub key: StorageKey,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// An opened object
pub struct BlobReader {
    pub size: u64,
    pub stream: ByteStream,
}
