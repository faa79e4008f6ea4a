use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{StorageError, StorageResult, ValidationError},
        models::Entry,
        value_objects::{EntryName, LogicalPath, UserId},
    },
    ports::{
        services::{ExplorerService, FileStorage},
        storage::UploadStream,
    },
    services::{PathResolver, UserLocks},
};

/// Implementation of ExplorerService on top of FileStorage
#[derive(Clone)]
pub struct ExplorerServiceImpl {
    storage: Arc<dyn FileStorage>,
    resolver: PathResolver,
    locks: UserLocks,
}

impl ExplorerServiceImpl {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self {
            storage,
            resolver: PathResolver::new(),
            locks: UserLocks::new(),
        }
    }

    /// Share an existing lock table, e.g. between several service instances
    pub fn with_locks(storage: Arc<dyn FileStorage>, locks: UserLocks) -> Self {
        Self {
            storage,
            resolver: PathResolver::new(),
            locks,
        }
    }

    fn join(
        &self,
        dir: &LogicalPath,
        name: &EntryName,
        directory: bool,
    ) -> StorageResult<LogicalPath> {
        let joined = if directory {
            dir.child_directory(name)
        } else {
            dir.child_file(name)
        };
        joined.map_err(|reason| StorageError::invalid_path(format!("{}{}", dir, name), reason))
    }

    async fn ensure_absent(&self, user: UserId, path: &LogicalPath) -> StorageResult<()> {
        if self.storage.is_exist(user, path.as_str()).await? {
            return Err(StorageError::already_exists(path.as_str()));
        }
        Ok(())
    }

    /// Re-create a parent that only existed through the keys just deleted
    async fn keep_parent(&self, user: UserId, parent: &LogicalPath) -> StorageResult<()> {
        if !self.storage.is_exist(user, parent.as_str()).await? {
            debug!("Restore marker of '{}' for user {}", parent, user);
            self.storage.create_path(user, parent.as_str()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ExplorerService for ExplorerServiceImpl {
    async fn create_directory(
        &self,
        user: UserId,
        parent: &str,
        name: &str,
    ) -> StorageResult<LogicalPath> {
        let parent = self.resolver.parse_directory(parent)?;
        let name = self.resolver.parse_name(name)?;
        let target = self.join(&parent, &name, true)?;

        let _guard = self.locks.acquire(user).await;
        self.ensure_absent(user, &target).await?;

        info!("Create directory '{}' for user {}", target, user);
        self.storage.create_path(user, target.as_str()).await?;
        Ok(target)
    }

    async fn list_directory(&self, user: UserId, dir: &str) -> StorageResult<Vec<Entry>> {
        let dir = self.resolver.parse_directory(dir)?;
        self.storage
            .list_entries(user, dir.as_str())
            .await?
            .ok_or_else(|| StorageError::not_found(dir.as_str()))
    }

    async fn rename_file(
        &self,
        user: UserId,
        parent: &str,
        current_name: &str,
        new_name: &str,
    ) -> StorageResult<LogicalPath> {
        let parent = self.resolver.parse_directory(parent)?;
        let source = self.join(&parent, &self.resolver.parse_name(current_name)?, false)?;
        let target = self.join(&parent, &self.resolver.parse_name(new_name)?, false)?;

        let _guard = self.locks.acquire(user).await;
        self.ensure_absent(user, &target).await?;

        info!(
            "Rename file '{}' to '{}' for user {}",
            source, target, user
        );
        self.storage
            .copy_one_object(user, source.as_str(), target.as_str())
            .await?;
        self.storage.delete_objects(user, source.as_str()).await?;
        Ok(target)
    }

    async fn rename_folder(
        &self,
        user: UserId,
        current: &str,
        new_name: &str,
    ) -> StorageResult<LogicalPath> {
        let source = self.resolver.parse_directory(current)?;
        if source.is_root() {
            return Err(StorageError::invalid_path(
                source.as_str(),
                ValidationError::RootDirectory,
            ));
        }
        let name = self.resolver.parse_name(new_name)?;
        let target = source
            .with_name(&name)
            .map_err(|reason| StorageError::invalid_path(new_name, reason))?;

        let _guard = self.locks.acquire(user).await;
        self.ensure_absent(user, &target).await?;

        info!(
            "Rename folder '{}' to '{}' for user {}",
            source, target, user
        );
        let copied = self
            .storage
            .copy_objects(user, source.as_str(), target.as_str())
            .await?;
        if copied == 0 {
            self.storage.create_path(user, target.as_str()).await?;
        }
        self.storage.delete_objects(user, source.as_str()).await?;

        debug!("Moved {} objects into '{}'", copied, target);
        Ok(target)
    }

    async fn delete_folder(&self, user: UserId, dir: &str) -> StorageResult<()> {
        let dir = self.resolver.parse_directory(dir)?;
        let parent = dir.parent();

        let _guard = self.locks.acquire(user).await;
        info!("Delete folder '{}' for user {}", dir, user);
        self.storage.delete_objects(user, dir.as_str()).await?;
        self.keep_parent(user, &parent).await
    }

    async fn delete_file(&self, user: UserId, parent: &str, name: &str) -> StorageResult<()> {
        let parent = self.resolver.parse_directory(parent)?;
        let path = self.join(&parent, &self.resolver.parse_name(name)?, false)?;

        let _guard = self.locks.acquire(user).await;
        info!("Delete file '{}' for user {}", path, user);
        self.storage.delete_objects(user, path.as_str()).await?;
        self.keep_parent(user, &parent).await
    }

    async fn upload_file(
        &self,
        user: UserId,
        dir: &str,
        name: &str,
        data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        let dir = self.resolver.parse_directory(dir)?;
        let name = self.resolver.parse_name(name)?;
        let target = self.join(&dir, &name, false)?;

        let _guard = self.locks.acquire(user).await;
        self.ensure_absent(user, &target).await?;

        info!("Upload '{}' for user {}", target, user);
        self.storage
            .save_object(
                user,
                dir.as_str(),
                name.as_str(),
                data,
                declared_length,
                content_type,
            )
            .await
    }

    async fn prepare_folder_upload(
        &self,
        user: UserId,
        dir: &str,
        relative_path: &str,
    ) -> StorageResult<LogicalPath> {
        let dir = self.resolver.parse_directory(dir)?;
        let relative = self.resolver.parse_file(relative_path)?;

        let top = match relative.as_str().split_once('/') {
            Some((top, _)) => format!("{}{}/", dir, top),
            None => format!("{}{}", dir, relative),
        };
        let top = self.resolver.parse(&top)?;

        let _guard = self.locks.acquire(user).await;
        self.ensure_absent(user, &top).await?;

        info!("Folder upload into '{}' for user {}", top, user);
        Ok(top)
    }

    async fn upload_folder_file(
        &self,
        user: UserId,
        dir: &str,
        relative_path: &str,
        data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        let dir = self.resolver.parse_directory(dir)?;
        let relative = self.resolver.parse_file(relative_path)?;

        let _guard = self.locks.acquire(user).await;
        debug!("Upload '{}{}' for user {}", dir, relative, user);
        self.storage
            .save_object(
                user,
                dir.as_str(),
                relative.as_str(),
                data,
                declared_length,
                content_type,
            )
            .await
    }
}
