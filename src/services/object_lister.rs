use std::sync::Arc;

use crate::{
    domain::{
        errors::StorageResult,
        value_objects::{LogicalPath, UserId},
    },
    ports::storage::{BlobInfo, BlobStore},
    services::PathResolver,
};

/// Prefix listings of a user's directories
#[derive(Clone)]
pub struct ObjectLister {
    store: Arc<dyn BlobStore>,
    resolver: PathResolver,
}

impl ObjectLister {
    pub fn new(store: Arc<dyn BlobStore>, resolver: PathResolver) -> Self {
        Self { store, resolver }
    }

    /// List the keys under a directory, without the directory's own marker.
    ///
    /// Returns `None` when nothing shares the prefix, except for the root,
    /// which always exists.
    pub async fn list(
        &self,
        user: UserId,
        dir: &LogicalPath,
        recursive: bool,
    ) -> StorageResult<Option<Vec<BlobInfo>>> {
        let prefix = self.resolver.key_for(user, dir);
        let items = self.store.list(prefix.as_str(), recursive, None).await?;

        if items.is_empty() && !dir.is_root() {
            return Ok(None);
        }

        Ok(Some(
            items.into_iter().filter(|item| item.key != prefix).collect(),
        ))
    }
}
