pub mod explorer_handlers;
pub mod preview_handlers;
pub mod search_handlers;
pub mod transfer_handlers;

pub use explorer_handlers::*;
pub use preview_handlers::*;
pub use search_handlers::*;
pub use transfer_handlers::*;

use axum::{http::StatusCode, Json};

use crate::{
    adapters::inbound::http::dto::ErrorResponseDto,
    domain::errors::{PreviewError, StorageError},
};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

pub(crate) fn api_error(error: StorageError) -> ApiError {
    let status = StatusCode::from(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }
    (status, Json(ErrorResponseDto::from_storage_error(&error)))
}

pub(crate) fn preview_error(error: PreviewError) -> ApiError {
    let status = match &error {
        PreviewError::Storage(inner) => return api_error(inner.clone()),
        PreviewError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        PreviewError::ImageProcessing { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    tracing::warn!("Preview failed: {}", error);
    (status, Json(ErrorResponseDto::from_preview_error(&error)))
}
