// Infrastructure error conversions
pub mod error;

// Storage implementations
pub mod apache_object_store_adapter;
pub mod s3;

// Re-export key types
pub use apache_object_store_adapter::{ApacheObjectStoreAdapter, FOLDER_MARKER};
pub use s3::{create_s3_store, S3Config};
