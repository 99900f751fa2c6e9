use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Stored user record. Deliberately not `Serialize`: responses that expose a
/// user go through dedicated response structs so the password hash can never
/// leak into a body.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
