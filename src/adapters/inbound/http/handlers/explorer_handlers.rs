use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::adapters::inbound::http::{
    dto::{
        CreateFolderDto, DeleteFileQuery, EntryDto, ListEntriesResponseDto, PathQuery,
        RenameFileDto, RenameFolderDto, SuccessResponseDto,
    },
    handlers::{api_error, ApiError},
    identity::ActingUser,
    router::AppState,
};

/// Handle directory listing
pub async fn list_entries(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
) -> Result<Json<ListEntriesResponseDto>, ApiError> {
    let entries = app_state
        .explorer
        .list_directory(user, &params.path)
        .await
        .map_err(api_error)?;

    let entries: Vec<EntryDto> = entries.into_iter().map(EntryDto::from).collect();
    Ok(Json(ListEntriesResponseDto {
        path: params.path,
        total_count: entries.len(),
        entries,
    }))
}

/// Handle folder creation
pub async fn create_folder(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(request): Json<CreateFolderDto>,
) -> Result<(StatusCode, Json<SuccessResponseDto>), ApiError> {
    let created = app_state
        .explorer
        .create_directory(user, &request.parent, &request.name)
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponseDto::with_data(
            "Folder created successfully",
            serde_json::json!({ "path": created.as_str() }),
        )),
    ))
}

/// Handle folder rename
pub async fn rename_folder(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(request): Json<RenameFolderDto>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    let renamed = app_state
        .explorer
        .rename_folder(user, &request.path, &request.new_name)
        .await
        .map_err(api_error)?;

    Ok(Json(SuccessResponseDto::with_data(
        "Folder renamed successfully",
        serde_json::json!({ "path": renamed.as_str() }),
    )))
}

/// Handle folder deletion
pub async fn delete_folder(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<PathQuery>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    app_state
        .explorer
        .delete_folder(user, &params.path)
        .await
        .map_err(api_error)?;

    Ok(Json(SuccessResponseDto::new("Folder deleted successfully")))
}

/// Handle file rename
pub async fn rename_file(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(request): Json<RenameFileDto>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    let renamed = app_state
        .explorer
        .rename_file(
            user,
            &request.parent,
            &request.current_name,
            &request.new_name,
        )
        .await
        .map_err(api_error)?;

    Ok(Json(SuccessResponseDto::with_data(
        "File renamed successfully",
        serde_json::json!({ "path": renamed.as_str() }),
    )))
}

/// Handle file deletion
pub async fn delete_file(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<DeleteFileQuery>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    app_state
        .explorer
        .delete_file(user, &params.parent, &params.name)
        .await
        .map_err(api_error)?;

    Ok(Json(SuccessResponseDto::new("File deleted successfully")))
}
