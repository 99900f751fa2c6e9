use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;

/// Acting identity extracted from a bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

/// Required authentication: rejects with 401 when the token is missing or
/// invalid.
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_from_headers(&parts.headers).map_err(ApiError::unauthorized)?;
        let claims = validate_jwt(&token).map_err(ApiError::unauthorized)?;

        Ok(AuthUser::from(claims))
    }
}

/// Optional authentication for routes that serve anonymous reads.
///
/// No Authorization header resolves to anonymous. A header that is present
/// but fails validation is still a 401: an offered credential that does not
/// check out must not silently degrade to anonymous.
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if parts.headers.get("authorization").is_none()
            && parts.headers.get("Authorization").is_none()
        {
            return Ok(Self(None));
        }

        AuthUser::from_request_parts(parts, state)
            .await
            .map(|user| Self(Some(user)))
    }
}

impl MaybeAuthUser {
    /// Resolve to a concrete user, or fail with 403 for anonymous callers.
    pub fn require(self, action: &str) -> Result<AuthUser, ApiError> {
        self.0
            .ok_or_else(|| ApiError::forbidden(format!("You must be authenticated to {}", action)))
    }
}

/// Extract the bearer token from the Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
