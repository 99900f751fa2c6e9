// POST /register/ - open to unauthenticated callers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::require_field;
use crate::auth::password;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::NewUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public fields only; the password never appears in a response.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub username: String,
    pub email: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> ApiResult<RegisteredUser> {
    let username = require_field(payload.username, "username")?;
    let email = require_field(payload.email, "email")?;
    let password = require_field(payload.password, "password")?;

    let password_hash = password::hash_password(&password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to process password")
    })?;

    // Username uniqueness is enforced by the store
    let user = state
        .store
        .create_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {}", user.username);

    Ok(ApiResponse::created(RegisteredUser {
        username: user.username,
        email: user.email,
    }))
}
