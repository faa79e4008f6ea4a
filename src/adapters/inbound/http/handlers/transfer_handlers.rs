use axum::{
    body::Body,
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{StreamExt, TryStreamExt};
use std::io;
use tokio::{io::DuplexStream, task::JoinHandle};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::{
    adapters::inbound::http::{
        dto::{ErrorResponseDto, PathQuery, SuccessResponseDto, UploadFileQuery},
        handlers::{api_error, ApiError},
        identity::ActingUser,
        router::AppState,
    },
    domain::{
        errors::{StorageError, StorageResult},
        models::{content_type_for, ContentStatus},
    },
    services::RangeResponse,
};

/// Buffer between a producing task and the response body
const PIPE_CAPACITY: usize = 64 * 1024;

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponseDto::bad_request(message)),
    )
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponseDto::internal_error("Invalid response header")),
        )
    })
}

/// `attachment` disposition with an RFC 5987 encoded file name
fn attachment(encoded_name: &str) -> String {
    format!(
        "attachment; filename=\"{0}\"; filename*=UTF-8''{0}",
        encoded_name
    )
}

/// Copy a range response into a pipe from a background task.
///
/// The task ends quietly when the returned reader is dropped.
fn spawn_range_copy(
    response: RangeResponse,
    path: String,
) -> (ReaderStream<DuplexStream>, JoinHandle<StorageResult<u64>>) {
    let (mut writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
    let task = tokio::spawn(async move {
        let result = response.write_to(&mut writer).await;
        match &result {
            Ok(sent) => debug!("Streamed {} bytes of '{}'", sent, path),
            Err(e) => warn!("Stream of '{}' failed: {}", path, e),
        }
        result
    });
    (ReaderStream::new(reader), task)
}

/// Handle a single file upload sent as the raw request body
pub async fn upload_file(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<UploadFileQuery>,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<SuccessResponseDto>), ApiError> {
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_string());

    let data = body.into_data_stream().map_err(io::Error::other).boxed();

    app_state
        .explorer
        .upload_file(
            user,
            &params.path,
            &params.name,
            data,
            declared_length,
            content_type.as_deref(),
        )
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponseDto::new("File uploaded successfully")),
    ))
}

/// Handle a folder upload; every part's file name is a path relative to `path`
pub async fn upload_folder(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SuccessResponseDto>), ApiError> {
    let mut uploaded = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Malformed multipart body: {}", e)))?
    {
        let Some(relative_path) = field.file_name().map(str::to_string) else {
            debug!("Skipping multipart field without a file name");
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        if uploaded == 0 {
            app_state
                .explorer
                .prepare_folder_upload(user, &params.path, &relative_path)
                .await
                .map_err(api_error)?;
        }

        let data = field.map_err(io::Error::other).boxed();
        app_state
            .explorer
            .upload_folder_file(
                user,
                &params.path,
                &relative_path,
                data,
                None,
                content_type.as_deref(),
            )
            .await
            .map_err(api_error)?;
        uploaded += 1;
    }

    if uploaded == 0 {
        return Err(bad_request("No files in upload"));
    }

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponseDto::with_data(
            "Folder uploaded successfully",
            serde_json::json!({ "files": uploaded }),
        )),
    ))
}

/// Handle a whole-file download
pub async fn download_file(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let handle = app_state
        .file_storage
        .get_object(user, &params.path)
        .await
        .map_err(api_error)?;

    let encoded = urlencoding::encode(handle.path().name()).into_owned();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(handle.byte_length()));
    headers.insert(header::CONTENT_DISPOSITION, header_value(&attachment(&encoded))?);

    Ok((headers, Body::from_stream(handle.into_stream())).into_response())
}

/// Handle a folder download, zipped while it streams
pub async fn download_folder(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let archive = app_state
        .archive_streamer
        .open(user, &params.path)
        .await
        .map_err(api_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&attachment(&archive.encoded_file_name()))?,
    );

    let (mut writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
    let folder = params.path.clone();
    tokio::spawn(async move {
        match archive.write_to(&mut writer).await {
            Ok(summary) if summary.completed => debug!(
                "Archive of '{}' sent: {} entries, {} bytes",
                folder, summary.entries, summary.bytes_written
            ),
            Ok(summary) => debug!(
                "Archive of '{}' abandoned by client after {} bytes",
                folder, summary.bytes_written
            ),
            Err(e) => warn!("Archive of '{}' failed: {}", folder, e),
        }
    });

    Ok((headers, Body::from_stream(ReaderStream::new(reader))).into_response())
}

/// Handle a streamed read that honors the `Range` header
pub async fn stream_file(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
    request_headers: HeaderMap,
) -> Result<Response, Response> {
    let range_header = request_headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let response = match app_state
        .range_streamer
        .open_with_header(user, &params.path, range_header)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            let unsatisfied = match &e {
                StorageError::RangeNotSatisfiable { length, .. } => {
                    HeaderValue::from_str(&format!("bytes */{}", length)).ok()
                }
                _ => None,
            };
            let mut rejection = api_error(e).into_response();
            if let Some(value) = unsatisfied {
                rejection.headers_mut().insert(header::CONTENT_RANGE, value);
            }
            return Err(rejection);
        }
    };

    let status = match response.status {
        ContentStatus::Partial => StatusCode::PARTIAL_CONTENT,
        ContentStatus::Full => StatusCode::OK,
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&params.path)),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(response.content_length()),
    );
    if let Some(content_range) = response.content_range() {
        headers.insert(
            header::CONTENT_RANGE,
            header_value(&content_range).map_err(IntoResponse::into_response)?,
        );
    }

    let (body, _) = spawn_range_copy(response, params.path);
    Ok((status, headers, Body::from_stream(body)).into_response())
}
