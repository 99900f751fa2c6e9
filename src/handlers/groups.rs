// /groups/ resource handlers.
//
// Groups have no owner, so mutations carry no ownership check. Creation via
// the collection endpoint is a hardwired 405 - a product decision, not a
// validation outcome - and ignores payload and caller identity entirely.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::require_field;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{Group, GroupChanges};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GroupPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Group>> {
    Ok(ApiResponse::success(state.store.list_groups().await?))
}

/// POST /groups/ - always refused. No extractors: the body is never read,
/// so even malformed JSON gets the same 405.
pub async fn create_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Group creation through this endpoint is not allowed")
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Group> {
    Ok(ApiResponse::success(state.store.group(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<GroupPayload>,
) -> ApiResult<Group> {
    apply_update(state, id, payload, false).await
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<GroupPayload>,
) -> ApiResult<Group> {
    apply_update(state, id, payload, true).await
}

async fn apply_update(
    state: AppState,
    id: i64,
    payload: GroupPayload,
    partial: bool,
) -> ApiResult<Group> {
    let existing = state.store.group(id).await?;

    let changes = if partial {
        GroupChanges {
            title: payload.title.unwrap_or(existing.title),
            slug: payload.slug.unwrap_or(existing.slug),
            description: payload.description.unwrap_or(existing.description),
        }
    } else {
        GroupChanges {
            title: require_field(payload.title, "title")?,
            slug: require_field(payload.slug, "slug")?,
            description: payload.description.unwrap_or_default(),
        }
    };

    Ok(ApiResponse::success(
        state.store.update_group(id, changes).await?,
    ))
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_group(id).await?;
    Ok(ApiResponse::<()>::no_content())
}
