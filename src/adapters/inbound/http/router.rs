use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    create_folder, delete_file, delete_folder, download_file, download_folder, health,
    list_entries, preview_image, preview_music, rename_file, rename_folder, search_entries,
    stream_file, upload_file, upload_folder,
};
use crate::{
    app::AppServices,
    ports::services::{ExplorerService, FileStorage},
    services::{ArchiveStreamer, PreviewService, RangeStreamer, SearchService},
};

/// Application state containing all services
#[derive(Clone)]
pub struct AppState {
    pub file_storage: Arc<dyn FileStorage>,
    pub explorer: Arc<dyn ExplorerService>,
    pub search: SearchService,
    pub range_streamer: RangeStreamer,
    pub archive_streamer: ArchiveStreamer,
    pub preview: PreviewService,
}

impl From<AppServices> for AppState {
    fn from(services: AppServices) -> Self {
        Self {
            file_storage: services.file_storage,
            explorer: services.explorer,
            search: services.search,
            range_streamer: services.range_streamer,
            archive_streamer: services.archive_streamer,
            preview: services.preview,
        }
    }
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(create_explorer_router())
        .merge(create_transfer_router())
        .merge(create_preview_router())
        .route("/api/search", get(search_entries))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Folder and file management endpoints
pub fn create_explorer_router() -> Router<AppState> {
    Router::new()
        .route("/api/entries", get(list_entries))
        .route(
            "/api/folders",
            post(create_folder).patch(rename_folder).delete(delete_folder),
        )
        .route("/api/files", put(upload_file).patch(rename_file).delete(delete_file))
}

/// Upload, download and streaming endpoints
pub fn create_transfer_router() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_folder))
        .route("/api/download", get(download_file))
        .route("/api/download-folder", get(download_folder))
        .route("/api/stream", get(stream_file))
        // uploads are streamed to the store, never buffered
        .layer(DefaultBodyLimit::disable())
}

/// Inline image and audio previews
pub fn create_preview_router() -> Router<AppState> {
    Router::new()
        .route("/api/preview/image", get(preview_image))
        .route("/api/preview/music", get(preview_music))
}
