use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config;
use crate::models::{
    Comment, CommentChanges, Group, GroupChanges, NewComment, NewGroup, NewPost, NewUser, Post,
    PostChanges, User,
};
use crate::store::{Store, StoreError};

// Posts and comments always serialize the author's username, so every read
// joins users once.
const POST_SELECT: &str = "SELECT p.id, p.text, u.username AS author, p.author_id, p.image, \
     p.group_id, p.pub_date FROM posts p JOIN users u ON u.id = p.author_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.text, u.username AS author, c.author_id, c.created, \
     c.post_id FROM comments c JOIN users u ON u.id = c.author_id";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect with pool settings from config and apply embedded migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let db_config = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.acquire_timeout_secs))
            .connect(url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("Connected to Postgres, migrations applied");
        Ok(Self { pool })
    }
}

/// Translate constraint violations into typed store errors; everything else
/// passes through for the API layer to log.
fn constraint_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or("");

        if db.is_unique_violation() {
            if constraint.contains("username") {
                return StoreError::UniqueViolation("username");
            }
            if constraint.contains("slug") {
                return StoreError::UniqueViolation("slug");
            }
        }

        if db.is_foreign_key_violation() {
            if constraint.contains("group") {
                return StoreError::MissingRelation("group");
            }
            if constraint.contains("post") {
                return StoreError::MissingRelation("post");
            }
            if constraint.contains("author") {
                return StoreError::MissingRelation("author");
            }
        }
    }

    StoreError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn group(&self, id: i64) -> Result<Group, StoreError> {
        sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Group not found".to_string()))
    }

    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO groups (title, slug, description) VALUES ($1, $2, $3) \
             RETURNING id, title, slug, description",
        )
        .bind(&new.title)
        .bind(&new.slug)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)
    }

    async fn update_group(&self, id: i64, changes: GroupChanges) -> Result<Group, StoreError> {
        sqlx::query_as::<_, Group>(
            "UPDATE groups SET title = $1, slug = $2, description = $3 WHERE id = $4 \
             RETURNING id, title, slug, description",
        )
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(constraint_error)?
        .ok_or_else(|| StoreError::NotFound("Group not found".to_string()))
    }

    async fn delete_group(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Group not found".to_string()));
        }
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(&format!("{} ORDER BY p.id", POST_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn post(&self, id: i64) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(&format!("{} WHERE p.id = $1", POST_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Post not found".to_string()))
    }

    async fn create_post(&self, new: NewPost) -> Result<Post, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO posts (text, author_id, image, group_id) VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(&new.text)
        .bind(new.author_id)
        .bind(&new.image)
        .bind(new.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)?;

        self.post(id).await
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, StoreError> {
        let result = sqlx::query("UPDATE posts SET text = $1, image = $2, group_id = $3 WHERE id = $4")
            .bind(&changes.text)
            .bind(&changes.image)
            .bind(changes.group_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(constraint_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Post not found".to_string()));
        }

        self.post(id).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), StoreError> {
        // Comments cascade at the schema level
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Post not found".to_string()));
        }
        Ok(())
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let comments =
            sqlx::query_as::<_, Comment>(&format!("{} WHERE c.post_id = $1 ORDER BY c.id", COMMENT_SELECT))
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(comments)
    }

    async fn comment(&self, post_id: i64, id: i64) -> Result<Comment, StoreError> {
        sqlx::query_as::<_, Comment>(&format!(
            "{} WHERE c.post_id = $1 AND c.id = $2",
            COMMENT_SELECT
        ))
        .bind(post_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Comment not found".to_string()))
    }

    async fn create_comment(&self, new: NewComment) -> Result<Comment, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO comments (text, author_id, post_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&new.text)
        .bind(new.author_id)
        .bind(new.post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_error)?;

        self.comment(new.post_id, id).await
    }

    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        changes: CommentChanges,
    ) -> Result<Comment, StoreError> {
        let result = sqlx::query("UPDATE comments SET text = $1 WHERE id = $2 AND post_id = $3")
            .bind(&changes.text)
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Comment not found".to_string()));
        }

        self.comment(post_id, id).await
    }

    async fn delete_comment(&self, post_id: i64, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND post_id = $2")
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Comment not found".to_string()));
        }
        Ok(())
    }
}
