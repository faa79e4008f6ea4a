use anyhow::{Context, Result};
use clap::Parser;
use cloud_file_storage::{
    adapters::inbound::http::router::{create_router, AppState},
    app::{AppBuilder, AppConfig, StorageBackend},
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "cloud-file-storage")]
#[command(about = "Per-user folders and files on top of an object store", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Storage backend type: memory, s3 or minio
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// S3 endpoint URL (for MinIO)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 bucket name
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY")]
    s3_secret_key: Option<String>,

    /// Use SSL for MinIO connection
    #[arg(long, env = "MINIO_USE_SSL", default_value = "false")]
    minio_use_ssl: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let storage_backend = match self.storage_backend.as_str() {
            "memory" => StorageBackend::InMemory,
            "s3" => {
                let bucket = self
                    .s3_bucket
                    .clone()
                    .context("S3_BUCKET is required for S3 backend")?;

                StorageBackend::S3 {
                    bucket,
                    region: self.s3_region.clone(),
                    access_key: self.s3_access_key.clone(),
                    secret_key: self.s3_secret_key.clone(),
                }
            }
            "minio" => {
                let endpoint = self
                    .s3_endpoint
                    .clone()
                    .context("S3_ENDPOINT is required for MinIO backend")?;
                let bucket = self
                    .s3_bucket
                    .clone()
                    .context("S3_BUCKET is required for MinIO backend")?;
                let access_key = self
                    .s3_access_key
                    .clone()
                    .context("S3_ACCESS_KEY is required for MinIO backend")?;
                let secret_key = self
                    .s3_secret_key
                    .clone()
                    .context("S3_SECRET_KEY is required for MinIO backend")?;

                StorageBackend::MinIO {
                    endpoint,
                    bucket,
                    access_key,
                    secret_key,
                    use_ssl: self.minio_use_ssl,
                }
            }
            _ => anyhow::bail!("Unknown storage backend: {}", self.storage_backend),
        };

        Ok(AppConfig { storage_backend })
    }

    fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }

    fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_max_level(self.log_level())
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    info!("Starting cloud file storage");
    info!("Storage backend: {}", cli.storage_backend);

    let config = cli.to_app_config()?;
    let services = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    let router = create_router(AppState::from(services));

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}
