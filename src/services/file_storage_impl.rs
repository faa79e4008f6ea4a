use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ByteStream, Entry, EntryKind, FileHandle},
        value_objects::{LogicalPath, StorageKey, UserId},
    },
    ports::{
        services::FileStorage,
        storage::{BlobStore, UploadStream},
    },
    services::{search::match_ranges, EntryAggregator, ObjectLister, PathResolver},
};

/// Report a missing key by the caller's logical path
fn not_found_as(path: &LogicalPath) -> impl FnOnce(StorageError) -> StorageError + '_ {
    move |e| match e {
        StorageError::NotFound { .. } => StorageError::not_found(path.as_str()),
        other => other,
    }
}

/// Implementation of FileStorage over a BlobStore
#[derive(Clone)]
pub struct FileStorageImpl {
    store: Arc<dyn BlobStore>,
    resolver: PathResolver,
    lister: ObjectLister,
    aggregator: EntryAggregator,
}

impl FileStorageImpl {
    /// Create a new FileStorageImpl instance
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let resolver = PathResolver::new();
        Self {
            lister: ObjectLister::new(store.clone(), resolver),
            aggregator: EntryAggregator::new(resolver),
            store,
            resolver,
        }
    }

    /// Explain a failed ranged read against the object's actual size
    async fn range_failure(
        &self,
        key: &StorageKey,
        logical: &LogicalPath,
        offset: u64,
        length: u64,
        cause: StorageError,
    ) -> StorageError {
        match self.store.head(key).await {
            Ok(Some(info)) if offset >= info.size || offset.checked_add(length).is_none() => {
                warn!(
                    "Range at {} of {} bytes is outside '{}' ({} bytes)",
                    offset, length, logical, info.size
                );
                StorageError::RangeNotSatisfiable {
                    start: offset,
                    end: offset.saturating_add(length - 1),
                    length: info.size,
                }
            }
            Ok(Some(_)) => cause,
            Ok(None) => StorageError::not_found(logical.as_str()),
            Err(e) => e,
        }
    }

    fn lazy_stream(&self, key: StorageKey) -> ByteStream {
        if key.is_directory_marker() {
            return stream::empty().boxed();
        }
        let store = self.store.clone();
        stream::once(async move { store.get(&key).await.map(|reader| reader.stream) })
            .try_flatten()
            .boxed()
    }
}

#[async_trait]
impl FileStorage for FileStorageImpl {
    async fn is_exist(&self, user: UserId, path: &str) -> StorageResult<bool> {
        let logical = self.resolver.parse(path)?;
        if logical.is_root() {
            return Ok(true);
        }

        let key = self.resolver.key_for(user, &logical);
        if logical.is_directory() {
            let found = self.store.list(key.as_str(), true, Some(1)).await?;
            Ok(!found.is_empty())
        } else {
            Ok(self.store.head(&key).await?.is_some())
        }
    }

    async fn create_path(&self, user: UserId, path: &str) -> StorageResult<()> {
        let logical = self.resolver.parse_directory(path)?;
        let key = self.resolver.key_for(user, &logical);

        info!("Create path '{}' for user {}", logical, user);
        self.store.put_object(&key, Bytes::new(), None).await
    }

    async fn get_object(&self, user: UserId, path: &str) -> StorageResult<FileHandle> {
        let logical = self.resolver.parse_file(path)?;
        let key = self.resolver.key_for(user, &logical);

        debug!("Open '{}' for user {}", logical, user);
        let reader = self.store.get(&key).await.map_err(not_found_as(&logical))?;

        Ok(FileHandle::new(logical, reader.size, reader.stream))
    }

    async fn get_objects(&self, user: UserId, path: &str) -> StorageResult<Vec<FileHandle>> {
        let logical = self.resolver.parse_directory(path)?;
        let items = self
            .lister
            .list(user, &logical, true)
            .await?
            .ok_or_else(|| StorageError::not_found(logical.as_str()))?;

        let mut handles = Vec::with_capacity(items.len());
        for item in items {
            let child = self.resolver.unresolve(user, &item.key);
            let child = match LogicalPath::parse(&child) {
                Ok(child) => child,
                Err(e) => {
                    warn!("Skipping unreadable key {}: {}", item.key, e);
                    continue;
                }
            };
            handles.push(FileHandle::new(child, item.size, self.lazy_stream(item.key)));
        }

        debug!(
            "Prepared {} handles under '{}' for user {}",
            handles.len(),
            logical,
            user
        );
        Ok(handles)
    }

    async fn save_object(
        &self,
        user: UserId,
        dir: &str,
        name: &str,
        data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        let dir = self.resolver.parse_directory(dir)?;
        let target = format!("{}{}", dir, name);
        let logical = self.resolver.parse_file(&target)?;
        let key = self.resolver.key_for(user, &logical);

        info!("Save '{}' for user {}", logical, user);
        let written = self
            .store
            .put_stream(&key, data, declared_length, content_type)
            .await?;
        debug!("Saved {} bytes to '{}'", written, logical);

        Ok(())
    }

    async fn copy_one_object(
        &self,
        user: UserId,
        source: &str,
        destination: &str,
    ) -> StorageResult<()> {
        let source = self.resolver.parse_file(source)?;
        let destination = self.resolver.parse_file(destination)?;

        info!("Copy '{}' to '{}' for user {}", source, destination, user);
        self.store
            .copy(
                &self.resolver.key_for(user, &source),
                &self.resolver.key_for(user, &destination),
            )
            .await
            .map_err(not_found_as(&source))
    }

    async fn copy_objects(
        &self,
        user: UserId,
        source: &str,
        destination: &str,
    ) -> StorageResult<usize> {
        let source = self.resolver.parse_directory(source)?;
        let destination = self.resolver.parse_directory(destination)?;
        let source_key = self.resolver.key_for(user, &source);
        let destination_key = self.resolver.key_for(user, &destination);

        let items = self
            .lister
            .list(user, &source, true)
            .await?
            .ok_or_else(|| StorageError::not_found(source.as_str()))?;

        info!(
            "Copy {} objects from '{}' to '{}' for user {}",
            items.len(),
            source,
            destination,
            user
        );

        let mut copied = 0;
        for item in &items {
            let Some(relative) = item.key.as_str().strip_prefix(source_key.as_str()) else {
                continue;
            };
            let target = StorageKey::new(format!("{}{}", destination_key, relative));
            debug!("Copy {} to {}", item.key, target);
            self.store.copy(&item.key, &target).await?;
            copied += 1;
        }

        Ok(copied)
    }

    async fn delete_objects(&self, user: UserId, path: &str) -> StorageResult<()> {
        let logical = self.resolver.parse(path)?;
        let key = self.resolver.key_for(user, &logical);

        if !logical.is_directory() {
            info!("Delete '{}' for user {}", logical, user);
            return self.store.remove(&key).await;
        }

        let items = self.store.list(key.as_str(), true, None).await?;
        info!(
            "Delete '{}' with {} objects for user {}",
            logical,
            items.len(),
            user
        );

        for item in items.iter().filter(|item| item.key != key) {
            self.store.remove(&item.key).await?;
        }

        // the user's root stays in place
        if !logical.is_root() {
            self.store.remove(&key).await?;
        }

        Ok(())
    }

    async fn get_direct_child_count(&self, user: UserId, path: &str) -> StorageResult<u64> {
        let logical = self.resolver.parse_directory(path)?;
        let key = self.resolver.key_for(user, &logical);

        let items = self.store.list(key.as_str(), false, None).await?;
        Ok(items.iter().filter(|item| item.key != key).count() as u64)
    }

    async fn list_entries(&self, user: UserId, path: &str) -> StorageResult<Option<Vec<Entry>>> {
        let logical = self.resolver.parse_directory(path)?;
        debug!("List '{}' for user {}", logical, user);

        let Some(items) = self.lister.list(user, &logical, false).await? else {
            return Ok(None);
        };

        // one level only; each sub-directory is counted with its own listing
        let mut entries = self.aggregator.aggregate(user, &logical, &items);
        for entry in entries.iter_mut() {
            if let EntryKind::Directory { child_count } = &mut entry.kind {
                *child_count = self.get_direct_child_count(user, &entry.path).await?;
            }
        }
        Ok(Some(entries))
    }

    async fn search_entries(
        &self,
        user: UserId,
        root: &str,
        query: &str,
    ) -> StorageResult<Vec<Entry>> {
        let root = self.resolver.parse_directory(root)?;
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items = self.lister.list(user, &root, true).await?.unwrap_or_default();
        let matches = items
            .into_iter()
            .filter_map(|item| {
                let path = self.resolver.unresolve(user, &item.key);
                if match_ranges(&path, query).is_empty() {
                    return None;
                }
                let name = {
                    let trimmed = path.strip_suffix('/').unwrap_or(&path);
                    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
                };
                Some(if item.key.is_directory_marker() {
                    Entry::directory(path, name, 0)
                } else {
                    Entry::file(path, name, item.size, item.last_modified)
                })
            })
            .collect();

        Ok(matches)
    }

    async fn get_range_of_object(
        &self,
        user: UserId,
        path: &str,
        offset: u64,
        length: u64,
    ) -> StorageResult<Bytes> {
        let logical = self.resolver.parse_file(path)?;
        if length == 0 {
            return Ok(Bytes::new());
        }

        let key = self.resolver.key_for(user, &logical);
        let Some(end) = offset.checked_add(length) else {
            let overflow = StorageError::transfer("Range end overflows");
            return Err(self.range_failure(&key, &logical, offset, length, overflow).await);
        };

        match self.store.get_range(&key, offset..end).await {
            Ok(bytes) => Ok(bytes),
            Err(StorageError::NotFound { .. }) => Err(StorageError::not_found(logical.as_str())),
            Err(e) => Err(self.range_failure(&key, &logical, offset, length, e).await),
        }
    }

    async fn object_length(&self, user: UserId, path: &str) -> StorageResult<u64> {
        let logical = self.resolver.parse_file(path)?;
        let key = self.resolver.key_for(user, &logical);

        self.store
            .head(&key)
            .await?
            .map(|info| info.size)
            .ok_or_else(|| StorageError::not_found(logical.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::storage::ApacheObjectStoreAdapter,
        ports::storage::{BlobInfo, BlobReader},
    };

    fn storage() -> FileStorageImpl {
        FileStorageImpl::new(Arc::new(ApacheObjectStoreAdapter::in_memory()))
    }

    fn body(data: &'static [u8]) -> UploadStream<'static> {
        stream::iter(vec![Ok(Bytes::from_static(data))]).boxed()
    }

    #[tokio::test]
    async fn test_root_child_counts() {
        let fs = storage();
        let user = UserId::new(1);

        fs.save_object(user, "", "rootFile.txt", body(b"r"), Some(1), None)
            .await
            .unwrap();
        fs.save_object(user, "folder/", "a.txt", body(b"a"), Some(1), None)
            .await
            .unwrap();
        fs.save_object(user, "folder/", "b.txt", body(b"b"), Some(1), None)
            .await
            .unwrap();
        fs.create_path(user, "emptyFolder/").await.unwrap();

        assert_eq!(fs.get_direct_child_count(user, "").await.unwrap(), 3);
        assert_eq!(fs.get_direct_child_count(user, "folder/").await.unwrap(), 2);
        assert_eq!(fs.get_direct_child_count(user, "emptyFolder/").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_is_exist_for_files_and_directories() {
        let fs = storage();
        let user = UserId::new(1);

        fs.save_object(user, "docs/", "a.txt", body(b"a"), None, None)
            .await
            .unwrap();

        assert!(fs.is_exist(user, "docs/").await.unwrap());
        assert!(fs.is_exist(user, "docs/a.txt").await.unwrap());
        assert!(!fs.is_exist(user, "docs/a").await.unwrap());
        assert!(!fs.is_exist(user, "other/").await.unwrap());
        assert!(fs.is_exist(user, "").await.unwrap());
        assert!(!fs.is_exist(UserId::new(2), "docs/").await.unwrap());
    }

    #[tokio::test]
    async fn test_flavor_checks() {
        let fs = storage();
        let user = UserId::new(1);

        assert!(matches!(
            fs.create_path(user, "not-a-dir").await,
            Err(StorageError::InvalidPath { .. })
        ));
        assert!(matches!(
            fs.get_object(user, "dir/").await,
            Err(StorageError::InvalidPath { .. })
        ));
        assert!(matches!(
            fs.save_object(user, "dir/", "", body(b""), None, None).await,
            Err(StorageError::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_objects_report_logical_path() {
        let fs = storage();
        let user = UserId::new(1);

        match fs.get_object(user, "ghost.txt").await {
            Err(StorageError::NotFound { path }) => assert_eq!(path, "ghost.txt"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert!(matches!(
            fs.copy_one_object(user, "ghost.txt", "b.txt").await,
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            fs.object_length(user, "ghost.txt").await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_file_leaves_similar_names() {
        let fs = storage();
        let user = UserId::new(1);

        fs.save_object(user, "", "a.txt", body(b"1"), None, None).await.unwrap();
        fs.save_object(user, "", "a.txt.bak", body(b"2"), None, None)
            .await
            .unwrap();

        fs.delete_objects(user, "a.txt").await.unwrap();

        assert!(!fs.is_exist(user, "a.txt").await.unwrap());
        assert!(fs.is_exist(user, "a.txt.bak").await.unwrap());
    }

    /// Records the `recursive` flag of every listing
    struct RecordingStore {
        inner: ApacheObjectStoreAdapter,
        listings: std::sync::Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl BlobStore for RecordingStore {
        async fn put_object(
            &self,
            key: &StorageKey,
            data: Bytes,
            content_type: Option<&str>,
        ) -> StorageResult<()> {
            self.inner.put_object(key, data, content_type).await
        }

        async fn put_stream(
            &self,
            key: &StorageKey,
            data: UploadStream<'_>,
            declared_length: Option<u64>,
            content_type: Option<&str>,
        ) -> StorageResult<u64> {
            self.inner
                .put_stream(key, data, declared_length, content_type)
                .await
        }

        async fn get(&self, key: &StorageKey) -> StorageResult<BlobReader> {
            self.inner.get(key).await
        }

        async fn get_range(
            &self,
            key: &StorageKey,
            range: std::ops::Range<u64>,
        ) -> StorageResult<Bytes> {
            self.inner.get_range(key, range).await
        }

        async fn head(&self, key: &StorageKey) -> StorageResult<Option<BlobInfo>> {
            self.inner.head(key).await
        }

        async fn list(
            &self,
            prefix: &str,
            recursive: bool,
            max_keys: Option<usize>,
        ) -> StorageResult<Vec<BlobInfo>> {
            self.listings
                .lock()
                .unwrap()
                .push((prefix.to_string(), recursive));
            self.inner.list(prefix, recursive, max_keys).await
        }

        async fn remove(&self, key: &StorageKey) -> StorageResult<()> {
            self.inner.remove(key).await
        }

        async fn copy(&self, source: &StorageKey, destination: &StorageKey) -> StorageResult<()> {
            self.inner.copy(source, destination).await
        }
    }

    #[tokio::test]
    async fn test_listing_reads_one_level_at_a_time() {
        let store = Arc::new(RecordingStore {
            inner: ApacheObjectStoreAdapter::in_memory(),
            listings: std::sync::Mutex::new(Vec::new()),
        });
        let fs = FileStorageImpl::new(store.clone());
        let user = UserId::new(1);

        fs.save_object(user, "", "top.txt", body(b"t"), None, None)
            .await
            .unwrap();
        fs.save_object(user, "a/b/c/", "deep.txt", body(b"d"), None, None)
            .await
            .unwrap();
        fs.save_object(user, "a/", "x.txt", body(b"x"), None, None)
            .await
            .unwrap();
        store.listings.lock().unwrap().clear();

        let listing = fs.list_entries(user, "").await.unwrap().unwrap();
        let summary: Vec<(&str, u64)> = listing
            .iter()
            .map(|e| (e.name.as_str(), e.size()))
            .collect();
        assert_eq!(summary, vec![("a", 2), ("top.txt", 1)]);

        let calls = store.listings.lock().unwrap().clone();
        assert!(calls.iter().all(|(_, recursive)| !recursive));
        let prefixes: Vec<&str> = calls.iter().map(|(prefix, _)| prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["user-1-files/", "user-1-files/a/"]);
    }

    #[tokio::test]
    async fn test_range_outside_object_is_not_satisfiable() {
        let fs = storage();
        let user = UserId::new(1);

        fs.save_object(user, "", "a.bin", body(b"01234"), Some(5), None)
            .await
            .unwrap();

        match fs.get_range_of_object(user, "a.bin", 10, 2).await {
            Err(StorageError::RangeNotSatisfiable { start, end, length }) => {
                assert_eq!((start, end, length), (10, 11, 5));
            }
            other => panic!("Expected RangeNotSatisfiable, got {:?}", other),
        }

        match fs.get_range_of_object(user, "a.bin", u64::MAX, 2).await {
            Err(StorageError::RangeNotSatisfiable { start, end, length }) => {
                assert_eq!((start, end, length), (u64::MAX, u64::MAX, 5));
            }
            other => panic!("Expected RangeNotSatisfiable, got {:?}", other),
        }

        assert!(matches!(
            fs.get_range_of_object(user, "ghost.bin", u64::MAX, 2).await,
            Err(StorageError::NotFound { .. })
        ));
        assert_eq!(
            &fs.get_range_of_object(user, "a.bin", 3, 2).await.unwrap()[..],
            b"34"
        );
    }

    #[tokio::test]
    async fn test_get_objects_opens_lazily() {
        let fs = storage();
        let user = UserId::new(1);

        fs.save_object(user, "pics/", "one.png", body(b"1"), None, None)
            .await
            .unwrap();
        fs.create_path(user, "pics/empty/").await.unwrap();

        let handles = fs.get_objects(user, "pics/").await.unwrap();
        let paths: Vec<&str> = handles.iter().map(|h| h.path().as_str()).collect();
        assert_eq!(paths, vec!["pics/empty/", "pics/one.png"]);

        // removing the object before reading makes the deferred open fail
        fs.delete_objects(user, "pics/one.png").await.unwrap();
        let mut handles = handles.into_iter();
        let marker = handles.next().unwrap();
        assert!(marker.into_bytes().await.unwrap().is_empty());
        let file = handles.next().unwrap();
        assert!(file.into_bytes().await.is_err());
    }
}
