use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::inbound::http::{
    dto::{ErrorResponseDto, PathQuery},
    handlers::{preview_error, ApiError},
    identity::ActingUser,
    router::AppState,
};

fn inline(encoded_name: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!("inline; filename=\"{}\"", encoded_name)).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponseDto::internal_error("Invalid response header")),
        )
    })
}

/// Serve an image for inline display, scaled down when wide
pub async fn preview_image(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let preview = app_state
        .preview
        .image(user, &params.path)
        .await
        .map_err(preview_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(preview.content_type),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(preview.data.len()),
    );
    headers.insert(header::CONTENT_DISPOSITION, inline(&preview.encoded_name)?);

    Ok((headers, Body::from(preview.data)).into_response())
}

/// Serve an audio file for inline playback
pub async fn preview_music(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let preview = app_state
        .preview
        .music(user, &params.path)
        .await
        .map_err(preview_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(preview.content_type),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(preview.handle.byte_length()),
    );
    headers.insert(header::CONTENT_DISPOSITION, inline(&preview.encoded_name)?);

    Ok((headers, Body::from_stream(preview.handle.into_stream())).into_response())
}
