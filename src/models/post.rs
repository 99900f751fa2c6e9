use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::permissions::Authored;

/// A blog post. `author` carries the author's username on the wire; the
/// numeric `author_id` stays internal and drives ownership checks.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author: String,
    #[serde(skip_serializing)]
    pub author_id: i64,
    pub image: Option<String>,
    #[serde(rename = "group")]
    pub group_id: Option<i64>,
    pub pub_date: DateTime<Utc>,
}

impl Authored for Post {
    const KIND: &'static str = "post";

    fn author_id(&self) -> i64 {
        self.author_id
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub image: Option<String>,
    pub group_id: Option<i64>,
}

/// Author and pub_date are write-once at creation and not part of changes.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub image: Option<String>,
    pub group_id: Option<i64>,
}
