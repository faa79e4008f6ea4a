use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode, Json};

use crate::{adapters::inbound::http::dto::ErrorResponseDto, domain::value_objects::UserId};

/// Header set by the upstream authentication layer
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request acts for.
///
/// Authentication happens upstream; this only trusts the numeric id it
/// forwards in [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponseDto>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponseDto::unauthorized("Missing user identity")),
                )
            })?;

        raw.trim().parse::<UserId>().map(ActingUser).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponseDto::unauthorized("Invalid user identity")),
            )
        })
    }
}
