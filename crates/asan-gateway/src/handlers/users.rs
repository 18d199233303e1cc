use super::public_user;
use crate::error::{AppError, Result};
use crate::model::OwnerQuery;
use crate::state::AppState;
use asan_core::collection::USERS;
use asan_storage::{Fields, Record};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

const USER_ID_HEADER: &str = "x-user-id";

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Record>> {
    let user = state
        .db()
        .find(USERS, |user| user.id() == Some(user_id.as_str()))
        .await?
        .ok_or(AppError::NotFound(None))?;

    Ok(Json(public_user(user)))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<Fields>,
) -> Result<Json<Record>> {
    let user = state
        .db()
        .update(USERS, &user_id, patch)
        .await?
        .ok_or(AppError::NotFound(None))?;

    Ok(Json(public_user(user)))
}

/// Resolves the caller from the `x-user-id` header, falling back to
/// `?userId=`.
pub async fn me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Record>> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .filter(|id| !id.is_empty())
        .or(query.user_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("userId required (x-user-id header or ?userId=)"))?;

    let user = state
        .db()
        .find(USERS, |user| user.id() == Some(user_id.as_str()))
        .await?
        .ok_or_else(|| AppError::NotFound(Some("not found".to_owned())))?;

    Ok(Json(public_user(user)))
}
