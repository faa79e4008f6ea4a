use async_trait::async_trait;

use crate::{
    domain::{
        errors::StorageResult,
        models::Entry,
        value_objects::{LogicalPath, UserId},
    },
    ports::storage::UploadStream,
};

/// User-facing folder operations with destination checks
#[async_trait]
pub trait ExplorerService: Send + Sync + 'static {
    /// Create `name/` inside `parent`
    async fn create_directory(
        &self,
        user: UserId,
        parent: &str,
        name: &str,
    ) -> StorageResult<LogicalPath>;

    /// Sorted direct children; missing directories are `NotFound`
    async fn list_directory(&self, user: UserId, dir: &str) -> StorageResult<Vec<Entry>>;

    async fn rename_file(
        &self,
        user: UserId,
        parent: &str,
        current_name: &str,
        new_name: &str,
    ) -> StorageResult<LogicalPath>;

    async fn rename_folder(
        &self,
        user: UserId,
        current: &str,
        new_name: &str,
    ) -> StorageResult<LogicalPath>;

    async fn delete_folder(&self, user: UserId, dir: &str) -> StorageResult<()>;

    async fn delete_file(&self, user: UserId, parent: &str, name: &str) -> StorageResult<()>;

    /// Store a new file; an existing file of that name is a conflict
    async fn upload_file(
        &self,
        user: UserId,
        dir: &str,
        name: &str,
        data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<()>;

    /// Check that the top-level segment of a folder upload is free in `dir`.
    ///
    /// Returns the path of that top-level entry.
    async fn prepare_folder_upload(
        &self,
        user: UserId,
        dir: &str,
        relative_path: &str,
    ) -> StorageResult<LogicalPath>;

    /// Store one file of a folder upload at `dir` + `relative_path`
    async fn upload_folder_file(
        &self,
        user: UserId,
        dir: &str,
        relative_path: &str,
        data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<()>;
}
