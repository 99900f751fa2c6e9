// /posts/{post_id}/comments/ resource handlers.
//
// Every operation is scoped to the parent post from the URL. Creation
// requires an authenticated caller (403 for anonymous) and stamps the new
// comment with that user and the URL's post; a nonexistent parent post is a
// 404 before anything else happens.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::require_field;
use crate::auth::permissions::ensure_author;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{Comment, CommentChanges, NewComment};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub text: Option<String>,
}

/// Listing against an unknown post id yields an empty list, not a 404:
/// the collection is a filter over the comment table.
pub async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Vec<Comment>> {
    Ok(ApiResponse::success(
        state.store.list_comments(post_id).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    user: MaybeAuthUser,
    Json(payload): Json<CommentPayload>,
) -> ApiResult<Comment> {
    let user = user.require("add a comment")?;

    // Resolve the parent first so an unknown post is a clean 404
    let post = state.store.post(post_id).await?;
    let text = require_field(payload.text, "text")?;

    let comment = state
        .store
        .create_comment(NewComment {
            author_id: user.id,
            post_id: post.id,
            text,
        })
        .await?;

    Ok(ApiResponse::created(comment))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
) -> ApiResult<Comment> {
    Ok(ApiResponse::success(state.store.comment(post_id, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
    user: MaybeAuthUser,
    Json(payload): Json<CommentPayload>,
) -> ApiResult<Comment> {
    apply_update(state, post_id, id, user, payload, false).await
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
    user: MaybeAuthUser,
    Json(payload): Json<CommentPayload>,
) -> ApiResult<Comment> {
    apply_update(state, post_id, id, user, payload, true).await
}

async fn apply_update(
    state: AppState,
    post_id: i64,
    id: i64,
    user: MaybeAuthUser,
    payload: CommentPayload,
    partial: bool,
) -> ApiResult<Comment> {
    // Lookup first so an unknown comment is a 404 even for anonymous callers
    let existing = state.store.comment(post_id, id).await?;
    let user = user.require("edit a comment")?;
    ensure_author(&user, &existing)?;

    let text = if partial {
        payload.text.unwrap_or(existing.text)
    } else {
        require_field(payload.text, "text")?
    };

    Ok(ApiResponse::success(
        state
            .store
            .update_comment(post_id, id, CommentChanges { text })
            .await?,
    ))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
    user: MaybeAuthUser,
) -> ApiResult<()> {
    let existing = state.store.comment(post_id, id).await?;
    let user = user.require("delete a comment")?;
    ensure_author(&user, &existing)?;

    state.store.delete_comment(post_id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
