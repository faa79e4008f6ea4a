use futures::StreamExt;
use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use zip::{result::ZipError, write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::FileHandle,
        value_objects::{LogicalPath, UserId},
    },
    ports::services::FileStorage,
    services::{range_streamer::is_disconnect, PathResolver},
};

/// Largest slice handed to the zip writer before its output is drained
pub const ARCHIVE_CHUNK_SIZE: usize = 8 * 1024;

/// In-memory sink the zip writer fills and the async side empties
#[derive(Clone, Default)]
struct SpoolBuffer(Arc<Mutex<Vec<u8>>>);

impl SpoolBuffer {
    fn take(&self) -> Vec<u8> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }
}

impl Write for SpoolBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn zip_error(err: ZipError) -> StorageError {
    StorageError::Transfer {
        message: format!("Failed to build archive: {}", err),
        detail: Some(err.to_string()),
    }
}

/// Outcome of streaming one archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub bytes_written: u64,
    /// `false` when the client went away before the archive was finished
    pub completed: bool,
}

/// A folder's descendants, opened lazily and ready to be zipped
pub struct FolderArchive {
    dir: LogicalPath,
    handles: Vec<FileHandle>,
}

impl FolderArchive {
    /// `<folder name>.zip`, or `files.zip` for the root
    pub fn file_name(&self) -> String {
        match self.dir.name() {
            "" => "files.zip".to_string(),
            name => format!("{}.zip", name),
        }
    }

    /// File name percent-encoded for a `Content-Disposition` header
    pub fn encoded_file_name(&self) -> String {
        urlencoding::encode(&self.file_name()).into_owned()
    }

    pub fn entry_count(&self) -> usize {
        self.handles.len()
    }

    /// Write the zip to `writer`, one entry per handle.
    ///
    /// Each handle is consumed and dropped once its entry is written; the
    /// zip output is drained after every slice so nothing accumulates.
    pub async fn write_to<W>(self, writer: &mut W) -> StorageResult<ArchiveSummary>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let spool = SpoolBuffer::default();
        let mut zip = ZipWriter::new_stream(spool.clone());
        let mut summary = ArchiveSummary {
            entries: 0,
            bytes_written: 0,
            completed: false,
        };

        for mut handle in self.handles {
            let name = match handle.path().relative_to(&self.dir) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            if name.ends_with('/') {
                zip.add_directory(name.as_str(), SimpleFileOptions::default())
                    .map_err(zip_error)?;
            } else {
                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Deflated)
                    .large_file(handle.byte_length() >= u64::from(u32::MAX));
                zip.start_file(name.as_str(), options).map_err(zip_error)?;

                while let Some(chunk) = handle.stream_mut().next().await {
                    let chunk = chunk?;
                    for piece in chunk.chunks(ARCHIVE_CHUNK_SIZE) {
                        zip.write_all(piece)?;
                        if !drain(&spool, writer, &mut summary).await? {
                            return Ok(summary);
                        }
                    }
                }
            }

            debug!("Archived '{}'", name);
            summary.entries += 1;
        }

        zip.finish().map_err(zip_error)?;
        if drain(&spool, writer, &mut summary).await? {
            summary.completed = match writer.flush().await {
                Ok(()) => true,
                Err(e) if is_disconnect(&e) => false,
                Err(e) => return Err(e.into()),
            };
        }

        Ok(summary)
    }
}

/// Move spooled zip bytes to the client; `false` once the client is gone
async fn drain<W>(
    spool: &SpoolBuffer,
    writer: &mut W,
    summary: &mut ArchiveSummary,
) -> StorageResult<bool>
where
    W: AsyncWrite + Unpin + Send,
{
    let pending = spool.take();
    if pending.is_empty() {
        return Ok(true);
    }

    match writer.write_all(&pending).await {
        Ok(()) => {
            summary.bytes_written += pending.len() as u64;
            Ok(true)
        }
        Err(e) if is_disconnect(&e) => {
            debug!(
                "Client disconnected after {} archive bytes",
                summary.bytes_written
            );
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Streams whole folders as zip archives
#[derive(Clone)]
pub struct ArchiveStreamer {
    storage: Arc<dyn FileStorage>,
    resolver: PathResolver,
}

impl ArchiveStreamer {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self {
            storage,
            resolver: PathResolver::new(),
        }
    }

    /// Collect the folder's descendants; fails before any byte is produced
    pub async fn open(&self, user: UserId, dir: &str) -> StorageResult<FolderArchive> {
        let dir = self.resolver.parse_directory(dir)?;
        let handles = self.storage.get_objects(user, dir.as_str()).await?;

        info!(
            "Archive '{}' with {} entries for user {}",
            dir,
            handles.len(),
            user
        );
        Ok(FolderArchive { dir, handles })
    }

    /// Open the folder and stream it to `writer`
    pub async fn write_zip<W>(
        &self,
        user: UserId,
        dir: &str,
        writer: &mut W,
    ) -> StorageResult<ArchiveSummary>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.open(user, dir).await?.write_to(writer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::storage::ApacheObjectStoreAdapter, ports::storage::UploadStream,
        services::FileStorageImpl,
    };
    use bytes::Bytes;
    use std::io::{Cursor, Read};

    fn body(data: Vec<u8>) -> UploadStream<'static> {
        futures::stream::iter(vec![Ok(Bytes::from(data))]).boxed()
    }

    async fn seeded() -> (Arc<FileStorageImpl>, ArchiveStreamer) {
        let storage = Arc::new(FileStorageImpl::new(Arc::new(
            ApacheObjectStoreAdapter::in_memory(),
        )));
        let user = UserId::new(1);
        storage
            .save_object(user, "My Docs/", "a.txt", body(b"alpha".to_vec()), None, None)
            .await
            .unwrap();
        storage
            .save_object(user, "My Docs/deep/", "b.bin", body(vec![7u8; 20_000]), None, None)
            .await
            .unwrap();
        storage.create_path(user, "My Docs/empty/").await.unwrap();
        (storage.clone(), ArchiveStreamer::new(storage))
    }

    #[tokio::test]
    async fn test_zip_contains_relative_entries() {
        let (_, streamer) = seeded().await;
        let mut out = Vec::new();

        let summary = streamer
            .write_zip(UserId::new(1), "My Docs/", &mut out)
            .await
            .unwrap();
        assert!(summary.completed);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.bytes_written, out.len() as u64);

        let mut archive = zip::ZipArchive::new(Cursor::new(out)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "deep/b.bin", "empty/"]);

        let mut content = String::new();
        archive
            .by_name("a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "alpha");

        let mut binary = Vec::new();
        archive
            .by_name("deep/b.bin")
            .unwrap()
            .read_to_end(&mut binary)
            .unwrap();
        assert_eq!(binary, vec![7u8; 20_000]);
    }

    #[tokio::test]
    async fn test_archive_names() {
        let (_, streamer) = seeded().await;
        let archive = streamer.open(UserId::new(1), "My Docs/").await.unwrap();
        assert_eq!(archive.file_name(), "My Docs.zip");
        assert_eq!(archive.encoded_file_name(), "My%20Docs.zip");
        assert_eq!(archive.entry_count(), 3);

        let root = streamer.open(UserId::new(1), "").await.unwrap();
        assert_eq!(root.file_name(), "files.zip");
    }

    #[tokio::test]
    async fn test_missing_folder_fails_before_streaming() {
        let (_, streamer) = seeded().await;
        let result = streamer.open(UserId::new(1), "Nope/").await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }
}
