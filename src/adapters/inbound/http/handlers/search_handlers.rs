use axum::{
    extract::{Query, State},
    Json,
};

use crate::adapters::inbound::http::{
    dto::{EntryDto, SearchQuery, SearchResponseDto, SuccessResponseDto},
    handlers::{api_error, ApiError},
    identity::ActingUser,
    router::AppState,
};

/// Handle search over the acting user's paths
pub async fn search_entries(
    State(app_state): State<AppState>,
    ActingUser(user): ActingUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponseDto>, ApiError> {
    let found = app_state
        .search
        .search(user, &params.query)
        .await
        .map_err(api_error)?;

    let entries: Vec<EntryDto> = found.into_iter().map(EntryDto::from).collect();
    Ok(Json(SearchResponseDto {
        query: params.query,
        total_count: entries.len(),
        entries,
    }))
}

pub async fn health() -> Json<SuccessResponseDto> {
    Json(SuccessResponseDto::new("OK"))
}
