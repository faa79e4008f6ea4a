use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::{
    buffered::BufWriter, memory::InMemory, path::Path as ObjectPath, Attribute, Attributes,
    ObjectMeta, ObjectStore as ApacheObjectStore, PutOptions, PutPayload,
};
use std::{collections::HashSet, ops::Range, sync::Arc};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::StorageKey,
    },
    ports::storage::{BlobInfo, BlobReader, BlobStore, UploadStream},
};

/// Child object that stands in for a key ending with `/`.
///
/// object_store paths cannot end with a delimiter, so the marker of `a/b/`
/// is stored as `a/b/*folder`. `*` never appears in a logical path.
pub const FOLDER_MARKER: &str = "*folder";

/// Adapter that implements our BlobStore port using Apache object_store
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
}

impl ApacheObjectStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self { inner: store }
    }

    /// Adapter over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    async fn list_one_level(&self, prefix: &str, limit: usize) -> StorageResult<Vec<BlobInfo>> {
        let scope = prefix.strip_suffix('/').unwrap_or(prefix);
        let scope_path = ObjectPath::from(scope);
        let listing = self
            .inner
            .list_with_delimiter((!scope.is_empty()).then_some(&scope_path))
            .await?;

        let mut items: Vec<BlobInfo> = listing
            .objects
            .iter()
            .map(|meta| blob_info(from_object_path(&meta.location), meta))
            .filter(|info| info.key.has_prefix(prefix))
            .collect();

        items.extend(listing.common_prefixes.iter().map(|common| {
            let mut key = from_object_path(common);
            key.push('/');
            BlobInfo {
                key: StorageKey::new(key),
                size: 0,
                last_modified: None,
            }
        }));

        items.sort_by(|a, b| a.key.cmp(&b.key));
        items.truncate(limit);
        Ok(items)
    }

    async fn list_scanning(
        &self,
        prefix: &str,
        recursive: bool,
        limit: usize,
    ) -> StorageResult<Vec<BlobInfo>> {
        // object_store lists by whole path segments, so scan from the last
        // complete segment and filter on the raw prefix
        let scope = prefix.rfind('/').map(|idx| &prefix[..idx]).unwrap_or("");
        let scope_path = ObjectPath::from(scope);
        let mut stream = self
            .inner
            .list((!scope.is_empty()).then_some(&scope_path));

        let mut items = Vec::new();
        let mut seen_prefixes = HashSet::new();

        while let Some(meta) = stream.next().await {
            let meta = meta?;
            let key = from_object_path(&meta.location);
            let Some(rest) = key.strip_prefix(prefix) else {
                continue;
            };

            if !recursive {
                if let Some(idx) = rest.find('/') {
                    let common = format!("{}{}", prefix, &rest[..=idx]);
                    if seen_prefixes.insert(common.clone()) {
                        items.push(BlobInfo {
                            key: StorageKey::new(common),
                            size: 0,
                            last_modified: None,
                        });
                    }
                    if items.len() >= limit {
                        break;
                    }
                    continue;
                }
            }

            items.push(blob_info(key, &meta));
            if items.len() >= limit {
                break;
            }
        }

        items.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(items)
    }

    async fn abort_upload(writer: &mut BufWriter, key: &StorageKey) {
        if let Err(e) = writer.abort().await {
            warn!("Failed to abort upload of {}: {}", key, e);
        }
    }
}

#[async_trait]
impl BlobStore for ApacheObjectStoreAdapter {
    async fn put_object(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        let path = to_object_path(key.as_str());
        let options = PutOptions {
            attributes: attributes_for(content_type),
            ..Default::default()
        };

        self.inner
            .put_opts(&path, PutPayload::from(data), options)
            .await?;

        Ok(())
    }

    async fn put_stream(
        &self,
        key: &StorageKey,
        mut data: UploadStream<'_>,
        declared_length: Option<u64>,
        content_type: Option<&str>,
    ) -> StorageResult<u64> {
        let path = to_object_path(key.as_str());
        let mut writer = BufWriter::new(self.inner.clone(), path)
            .with_attributes(attributes_for(content_type));
        let mut written = 0u64;

        while let Some(chunk) = data.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    Self::abort_upload(&mut writer, key).await;
                    return Err(StorageError::Transfer {
                        message: format!("Upload stream for {} failed: {}", key, e),
                        detail: Some(e.to_string()),
                    });
                }
            };

            if let Err(e) = writer.write_all(&chunk).await {
                Self::abort_upload(&mut writer, key).await;
                return Err(e.into());
            }
            written += chunk.len() as u64;
        }

        if let Some(declared) = declared_length {
            if declared != written {
                Self::abort_upload(&mut writer, key).await;
                return Err(StorageError::transfer(format!(
                    "Upload of {} declared {} bytes but received {}",
                    key, declared, written
                )));
            }
        }

        writer.shutdown().await?;
        debug!("Stored {} bytes at {}", written, key);

        Ok(written)
    }

    async fn get(&self, key: &StorageKey) -> StorageResult<BlobReader> {
        let path = to_object_path(key.as_str());
        let result = self.inner.get(&path).await?;
        let size = result.meta.size;
        let stream = result.into_stream().map_err(StorageError::from).boxed();

        Ok(BlobReader { size, stream })
    }

    async fn get_range(&self, key: &StorageKey, range: Range<u64>) -> StorageResult<Bytes> {
        let path = to_object_path(key.as_str());
        Ok(self.inner.get_range(&path, range).await?)
    }

    async fn head(&self, key: &StorageKey) -> StorageResult<Option<BlobInfo>> {
        let path = to_object_path(key.as_str());

        match self.inner.head(&path).await {
            Ok(meta) => Ok(Some(blob_info(key.as_str().to_string(), &meta))),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(
        &self,
        prefix: &str,
        recursive: bool,
        max_keys: Option<usize>,
    ) -> StorageResult<Vec<BlobInfo>> {
        let limit = max_keys.unwrap_or(usize::MAX);
        if limit == 0 {
            return Ok(Vec::new());
        }

        if !recursive && prefix.ends_with('/') {
            self.list_one_level(prefix, limit).await
        } else {
            self.list_scanning(prefix, recursive, limit).await
        }
    }

    async fn remove(&self, key: &StorageKey) -> StorageResult<()> {
        let path = to_object_path(key.as_str());

        match self.inner.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn copy(&self, source: &StorageKey, destination: &StorageKey) -> StorageResult<()> {
        let from = to_object_path(source.as_str());
        let to = to_object_path(destination.as_str());

        self.inner.copy(&from, &to).await?;

        Ok(())
    }
}

fn attributes_for(content_type: Option<&str>) -> Attributes {
    let mut attributes = Attributes::new();
    if let Some(content_type) = content_type {
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
    }
    attributes
}

fn blob_info(key: String, meta: &ObjectMeta) -> BlobInfo {
    BlobInfo {
        key: StorageKey::new(key),
        size: meta.size,
        last_modified: Some(meta.last_modified),
    }
}

fn to_object_path(key: &str) -> ObjectPath {
    match key.strip_suffix('/') {
        Some(dir) => ObjectPath::from(dir).child(FOLDER_MARKER),
        None => ObjectPath::from(key),
    }
}

fn from_object_path(location: &ObjectPath) -> String {
    let parts: Vec<String> = location
        .parts()
        .map(|part| {
            let raw = part.as_ref();
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
        .collect();

    match parts.split_last() {
        Some((last, parents)) if last == FOLDER_MARKER => format!("{}/", parents.join("/")),
        _ => parts.join("/"),
    }
}
