pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{ExplorerService, FileStorage};
pub use storage::{BlobInfo, BlobReader, BlobStore, UploadStream};
