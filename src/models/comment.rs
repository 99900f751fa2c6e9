use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::permissions::Authored;

/// A comment on a post. The parent post is fixed at creation from the URL
/// path and never reassignable; only `text` is editable.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author: String,
    #[serde(skip_serializing)]
    pub author_id: i64,
    pub created: DateTime<Utc>,
    #[serde(rename = "post")]
    pub post_id: i64,
}

impl Authored for Comment {
    const KIND: &'static str = "comment";

    fn author_id(&self) -> i64 {
        self.author_id
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: i64,
    pub post_id: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct CommentChanges {
    pub text: String,
}
