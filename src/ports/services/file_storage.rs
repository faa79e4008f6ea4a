use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    domain::{
        errors::StorageResult,
        models::{Entry, FileHandle},
        value_objects::UserId,
    },
    ports::storage::UploadStream,
};

/// Per-user hierarchical file operations over the flat backing store.
///
/// Every path is a logical path relative to the user's root; directory paths
/// end with `/` or are empty.
#[async_trait]
pub trait FileStorage: Send + Sync + 'static {
    /// Whether a directory (any key under its prefix) or a file exists
    async fn is_exist(&self, user: UserId, path: &str) -> StorageResult<bool>;

    /// Write the zero-byte marker of a directory
    async fn create_path(&self, user: UserId, path: &str) -> StorageResult<()>;

    /// Open one file
    async fn get_object(&self, user: UserId, path: &str) -> StorageResult<FileHandle>;

    /// Handles for every descendant of a directory, opened lazily
    async fn get_objects(&self, user: UserId, path: &str) -> StorageResult<Vec<FileHandle>>;

    /// Store `name` (which may itself contain `/`) under `dir`
    async fn save_object(
        &self,
        user: UserId,
        dir: &str,
        name: &str,
        data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<()>;

    /// Server-side copy of a single file
    async fn copy_one_object(&self, user: UserId, source: &str, destination: &str)
        -> StorageResult<()>;

    /// Copy every descendant of `source` under `destination`, returning the count
    async fn copy_objects(&self, user: UserId, source: &str, destination: &str)
        -> StorageResult<usize>;

    /// Remove a file, or a directory with all its descendants
    async fn delete_objects(&self, user: UserId, path: &str) -> StorageResult<()>;

    /// Number of direct children of a directory, its own marker excluded
    async fn get_direct_child_count(&self, user: UserId, path: &str) -> StorageResult<u64>;

    /// Direct children of a directory, `None` when it does not exist
    async fn list_entries(&self, user: UserId, path: &str) -> StorageResult<Option<Vec<Entry>>>;

    /// Descendants of `root` whose logical path contains `query`, ignoring case
    async fn search_entries(&self, user: UserId, root: &str, query: &str)
        -> StorageResult<Vec<Entry>>;

    /// Read `length` bytes of a file starting at `offset`
    async fn get_range_of_object(
        &self,
        user: UserId,
        path: &str,
        offset: u64,
        length: u64,
    ) -> StorageResult<Bytes>;

    /// Byte length of a file
    async fn object_length(&self, user: UserId, path: &str) -> StorageResult<u64>;
}
