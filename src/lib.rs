pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - paths, entries and errors
pub use domain::{
    ByteRange, ContentStatus, Entry, EntryKind, EntryName, FileHandle, FileType, LogicalPath,
    PreviewError, PreviewResult, StorageError, StorageKey, StorageResult, UserId,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{BlobInfo, BlobReader, BlobStore, ExplorerService, FileStorage, UploadStream};

// Service implementations - business logic
pub use services::{
    ArchiveStreamer, ExplorerServiceImpl, FileStorageImpl, PreviewService, RangeStreamer,
    SearchService,
};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, create_minio_app, create_s3_app, AppBuilder,
    AppConfig, AppDependencies, AppError, AppServices, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::ApacheObjectStoreAdapter;

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, create_minio_app, create_s3_app, ApacheObjectStoreAdapter,
        AppBuilder, AppServices, Entry, ExplorerService, FileStorage, LogicalPath, StorageError,
        UserId,
    };
}
