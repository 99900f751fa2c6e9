use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

pub mod comments;
pub mod groups;
pub mod posts;
pub mod register;
pub mod token;

/// Required-field validation shared by the payload handlers: the field must
/// be present and non-blank, else 400 with a field error.
fn require_field(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::field_error(field, "This field is required")),
    }
}

/// Deserializer for nullable payload fields: an absent field stays `None`
/// while an explicit `null` becomes `Some(None)`, so PATCH can tell "leave
/// unchanged" apart from "clear the field".
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Scribe API",
        "version": version,
        "description": "Small blogging REST API built with Rust (Axum)",
        "endpoints": {
            "register": "POST /register/",
            "token": "POST /api/v1/api-token-auth/",
            "posts": "GET/POST /posts/, GET/PUT/PATCH/DELETE /posts/{id}/",
            "groups": "GET /groups/, GET/PUT/PATCH/DELETE /groups/{id}/ (POST is 405)",
            "comments": "GET/POST /posts/{post_id}/comments/, GET/PUT/PATCH/DELETE /posts/{post_id}/comments/{id}/",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "storage": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "storage_error": e.to_string()
            })),
        ),
    }
}
