use object_store::{aws::AmazonS3Builder, ObjectStore as ObjectStoreBackend};
use std::sync::Arc;

use crate::domain::errors::{StorageError, StorageResult};

/// Configuration for an S3-compatible storage backend
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Custom endpoint for MinIO and other S3-compatible servers
    pub endpoint: Option<String>,
    pub allow_http: bool,
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> StorageResult<Arc<dyn ObjectStoreBackend>> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        // path-style addressing, as MinIO expects
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false);
    }

    let store = builder.build().map_err(StorageError::from)?;

    Ok(Arc::new(store))
}
