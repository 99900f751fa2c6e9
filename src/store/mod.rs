//! Persistence seam. Handlers only see the `Store` trait; the Postgres
//! implementation backs real deployments and the in-memory one backs local
//! runs without a `DATABASE_URL` plus the test suite.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Comment, CommentChanges, Group, GroupChanges, NewComment, NewGroup, NewPost, NewUser, Post,
    PostChanges, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    #[error("Missing relation: {0}")]
    MissingRelation(&'static str),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Storage liveness probe for /health
    async fn health(&self) -> Result<(), StoreError>;

    // Users
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    // Groups
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;
    async fn group(&self, id: i64) -> Result<Group, StoreError>;
    /// Administrative/seed path only; the public API refuses group creation.
    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError>;
    async fn update_group(&self, id: i64, changes: GroupChanges) -> Result<Group, StoreError>;
    async fn delete_group(&self, id: i64) -> Result<(), StoreError>;

    // Posts
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn post(&self, id: i64) -> Result<Post, StoreError>;
    async fn create_post(&self, new: NewPost) -> Result<Post, StoreError>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, StoreError>;
    async fn delete_post(&self, id: i64) -> Result<(), StoreError>;

    // Comments, always scoped to their parent post
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError>;
    async fn comment(&self, post_id: i64, id: i64) -> Result<Comment, StoreError>;
    async fn create_comment(&self, new: NewComment) -> Result<Comment, StoreError>;
    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        changes: CommentChanges,
    ) -> Result<Comment, StoreError>;
    async fn delete_comment(&self, post_id: i64, id: i64) -> Result<(), StoreError>;
}
