// /posts/ resource handlers.
//
// Mutations run lookup (404) before ownership (403) before payload
// validation (400), matching the original handler ordering.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::require_field;
use crate::auth::permissions::ensure_author;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{NewPost, Post, PostChanges};
use crate::AppState;

/// `author` and `pub_date` are read-only and have no payload fields; a
/// client sending them gets them silently ignored, serializer-style.
/// The nullable fields are double options so a PATCH carrying an explicit
/// null clears them instead of being read as absent.
#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub group: Option<Option<i64>>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Post>> {
    Ok(ApiResponse::success(state.store.list_posts().await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(payload): Json<PostPayload>,
) -> ApiResult<Post> {
    let user = user.require("create a post")?;
    let text = require_field(payload.text, "text")?;

    let post = state
        .store
        .create_post(NewPost {
            author_id: user.id,
            text,
            image: payload.image.flatten(),
            group_id: payload.group.flatten(),
        })
        .await?;

    Ok(ApiResponse::created(post))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.store.post(post_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: MaybeAuthUser,
    Json(payload): Json<PostPayload>,
) -> ApiResult<Post> {
    apply_update(state, post_id, user, payload, false).await
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: MaybeAuthUser,
    Json(payload): Json<PostPayload>,
) -> ApiResult<Post> {
    apply_update(state, post_id, user, payload, true).await
}

async fn apply_update(
    state: AppState,
    post_id: i64,
    user: MaybeAuthUser,
    payload: PostPayload,
    partial: bool,
) -> ApiResult<Post> {
    // Lookup first: an unknown id is a 404 for everyone, including
    // anonymous callers
    let existing = state.store.post(post_id).await?;
    let user = user.require("edit a post")?;
    ensure_author(&user, &existing)?;

    let changes = if partial {
        // PATCH merges over the stored record; an explicit null clears
        PostChanges {
            text: payload.text.unwrap_or(existing.text),
            image: payload.image.unwrap_or(existing.image),
            group_id: payload.group.unwrap_or(existing.group_id),
        }
    } else {
        // PUT is a full replacement; absent optional fields reset to null
        PostChanges {
            text: require_field(payload.text, "text")?,
            image: payload.image.flatten(),
            group_id: payload.group.flatten(),
        }
    };

    Ok(ApiResponse::success(
        state.store.update_post(post_id, changes).await?,
    ))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: MaybeAuthUser,
) -> ApiResult<()> {
    let existing = state.store.post(post_id).await?;
    let user = user.require("delete a post")?;
    ensure_author(&user, &existing)?;

    state.store.delete_post(post_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
