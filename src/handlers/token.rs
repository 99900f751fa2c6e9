// POST /api/v1/api-token-auth/ - credential exchange for a bearer token

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::require_field;
use crate::auth::{self, password, Claims};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn obtain(
    State(state): State<AppState>,
    Json(payload): Json<TokenPayload>,
) -> ApiResult<TokenResponse> {
    let username = require_field(payload.username, "username")?;
    let password_plain = require_field(payload.password, "password")?;

    let user = state.store.user_by_username(&username).await?;

    // One rejection for both unknown user and wrong password; the response
    // must not reveal which it was.
    let user = match user {
        Some(u) if password::verify_password(&password_plain, &u.password_hash) => u,
        _ => {
            return Err(ApiError::validation_error(
                "Unable to log in with the provided credentials",
                None,
            ))
        }
    };

    let token = auth::generate_jwt(Claims::new(user.id, user.username.clone())).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    Ok(ApiResponse::success(TokenResponse { token }))
}
