mod blob_store;

pub use blob_store::{BlobInfo, BlobReader, BlobStore, UploadStream};
