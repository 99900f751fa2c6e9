//! Ownership checks for author-owned resources.
//!
//! Posts and comments may only be mutated by their author. The check is the
//! same for both, so it lives behind one trait instead of being repeated in
//! every handler.

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// A resource that records its creating user and can be ownership-checked.
pub trait Authored {
    /// Noun used in error messages, e.g. "post" or "comment".
    const KIND: &'static str;

    fn author_id(&self) -> i64;
}

/// Reject with 403 unless `user` is the author of `resource`.
pub fn ensure_author<T: Authored>(user: &AuthUser, resource: &T) -> Result<(), ApiError> {
    if resource.author_id() != user.id {
        return Err(ApiError::forbidden(format!(
            "You cannot modify another user's {}",
            T::KIND
        )));
    }
    Ok(())
}
