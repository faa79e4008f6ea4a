use object_store::memory::InMemory;
use std::sync::Arc;
use tracing::info;

use crate::{
    adapters::outbound::storage::{create_s3_store, ApacheObjectStoreAdapter, S3Config},
    ports::{
        services::{ExplorerService, FileStorage},
        storage::BlobStore,
    },
    services::{
        ArchiveStreamer, ExplorerServiceImpl, FileStorageImpl, PreviewService, RangeStreamer,
        SearchService, UserLocks,
    },
};

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
}

/// Storage backend configuration
#[derive(Debug, Clone, Default)]
pub enum StorageBackend {
    #[default]
    InMemory,
    S3 {
        bucket: String,
        region: String,
        access_key: Option<String>,
        secret_key: Option<String>,
    },
    MinIO {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        use_ssl: bool,
    },
}

impl StorageBackend {
    fn name(&self) -> &'static str {
        match self {
            StorageBackend::InMemory => "memory",
            StorageBackend::S3 { .. } => "s3",
            StorageBackend::MinIO { .. } => "minio",
        }
    }
}

/// Application dependencies container
pub struct AppDependencies {
    pub blob_store: Arc<dyn BlobStore>,
    pub file_storage: Arc<dyn FileStorage>,
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub file_storage: Arc<dyn FileStorage>,
    pub explorer: Arc<dyn ExplorerService>,
    pub search: SearchService,
    pub range_streamer: RangeStreamer,
    pub archive_streamer: ArchiveStreamer,
    pub preview: PreviewService,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    locks: UserLocks,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            locks: UserLocks::new(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Share a lock table with other services of this process
    pub fn with_locks(mut self, locks: UserLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        let blob_store = self.create_blob_store()?;
        let file_storage: Arc<dyn FileStorage> = Arc::new(FileStorageImpl::new(blob_store.clone()));

        Ok(AppDependencies {
            blob_store,
            file_storage,
        })
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;
        let storage = deps.file_storage;

        info!(
            "Application built with '{}' storage backend",
            self.config.storage_backend.name()
        );

        Ok(AppServices {
            explorer: Arc::new(ExplorerServiceImpl::with_locks(
                storage.clone(),
                self.locks.clone(),
            )),
            search: SearchService::new(storage.clone()),
            range_streamer: RangeStreamer::new(storage.clone()),
            archive_streamer: ArchiveStreamer::new(storage.clone()),
            preview: PreviewService::new(storage.clone()),
            file_storage: storage,
        })
    }

    /// Create the storage adapter based on configuration
    fn create_blob_store(&self) -> Result<Arc<dyn BlobStore>, AppError> {
        let s3 = match &self.config.storage_backend {
            StorageBackend::InMemory => {
                return Ok(Arc::new(ApacheObjectStoreAdapter::new(Arc::new(
                    InMemory::new(),
                ))));
            }
            StorageBackend::S3 {
                bucket,
                region,
                access_key,
                secret_key,
            } => S3Config {
                bucket: bucket.clone(),
                region: region.clone(),
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
                endpoint: None,
                allow_http: false,
            },
            StorageBackend::MinIO {
                endpoint,
                bucket,
                access_key,
                secret_key,
                use_ssl,
            } => S3Config {
                bucket: bucket.clone(),
                region: "us-east-1".to_string(),
                access_key: Some(access_key.clone()),
                secret_key: Some(secret_key.clone()),
                endpoint: Some(endpoint_url(endpoint, *use_ssl)),
                allow_http: !use_ssl,
            },
        };

        let store = create_s3_store(&s3).map_err(|e| AppError::StorageInit {
            message: e.to_string(),
        })?;
        Ok(Arc::new(ApacheObjectStoreAdapter::new(store)))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix a bare `host:port` with the scheme matching `use_ssl`
fn endpoint_url(endpoint: &str, use_ssl: bool) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else if use_ssl {
        format!("https://{}", endpoint)
    } else {
        format!("http://{}", endpoint)
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .build()
        .await
}

/// Create a MinIO-backed application
pub async fn create_minio_app(
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
    use_ssl: bool,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::MinIO {
            endpoint,
            bucket,
            access_key,
            secret_key,
            use_ssl,
        })
        .build()
        .await
}

/// Create an S3-backed application
pub async fn create_s3_app(
    bucket: String,
    region: String,
    access_key: Option<String>,
    secret_key: Option<String>,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::S3 {
            bucket,
            region,
            access_key,
            secret_key,
        })
        .build()
        .await
}

fn required_env(name: &str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| AppError::Configuration {
        message: format!("{} environment variable required", name),
    })
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    let storage_backend = match std::env::var("STORAGE_BACKEND").as_deref() {
        Ok("s3") => StorageBackend::S3 {
            bucket: required_env("S3_BUCKET")?,
            region: required_env("S3_REGION")?,
            access_key: std::env::var("S3_ACCESS_KEY").ok(),
            secret_key: std::env::var("S3_SECRET_KEY").ok(),
        },
        Ok("minio") => StorageBackend::MinIO {
            endpoint: required_env("MINIO_ENDPOINT")?,
            bucket: required_env("MINIO_BUCKET")?,
            access_key: required_env("MINIO_ACCESS_KEY")?,
            secret_key: required_env("MINIO_SECRET_KEY")?,
            use_ssl: std::env::var("MINIO_USE_SSL")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        },
        Ok("memory") | Err(_) => StorageBackend::InMemory,
        Ok(other) => {
            return Err(AppError::Configuration {
                message: format!("Unknown storage backend: {}", other),
            })
        }
    };

    AppBuilder::new()
        .with_storage_backend(storage_backend)
        .build()
        .await
}
