mod archive_streamer;
mod entry_aggregator;
mod explorer_service_impl;
mod file_storage_impl;
mod object_lister;
mod path_resolver;
mod preview_service;
mod range_streamer;
mod search;
mod user_locks;

pub use archive_streamer::{ArchiveStreamer, ArchiveSummary, FolderArchive, ARCHIVE_CHUNK_SIZE};
pub use entry_aggregator::EntryAggregator;
pub use explorer_service_impl::ExplorerServiceImpl;
pub use file_storage_impl::FileStorageImpl;
pub use object_lister::ObjectLister;
pub use path_resolver::PathResolver;
pub use preview_service::{AudioPreview, ImagePreview, PreviewService, PREVIEW_IMAGE_WIDTH};
pub use range_streamer::{RangeResponse, RangeStreamer, RANGE_CHUNK_SIZE};
pub use search::SearchService;
pub use user_locks::UserLocks;
