use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{
    Comment, CommentChanges, Group, GroupChanges, NewComment, NewGroup, NewPost, NewUser, Post,
    PostChanges, User,
};
use crate::store::{Store, StoreError};

/// In-process storage. Backs local runs without a DATABASE_URL and the test
/// suite. Mirrors the relational behavior of the Postgres schema: unique
/// username and slug, comments cascade with their post, group deletion
/// detaches posts.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username_of(&self, user_id: i64) -> Result<String, StoreError> {
        self.users
            .get(&user_id)
            .map(|u| u.username.clone())
            .ok_or(StoreError::MissingRelation("author"))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::UniqueViolation("username"));
        }

        let id = inner.next_id();
        let user = User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.groups.values().cloned().collect())
    }

    async fn group(&self, id: i64) -> Result<Group, StoreError> {
        let inner = self.inner.read().await;
        inner
            .groups
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Group not found".to_string()))
    }

    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.groups.values().any(|g| g.slug == new.slug) {
            return Err(StoreError::UniqueViolation("slug"));
        }

        let id = inner.next_id();
        let group = Group {
            id,
            title: new.title,
            slug: new.slug,
            description: new.description,
        };
        inner.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn update_group(&self, id: i64, changes: GroupChanges) -> Result<Group, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.groups.contains_key(&id) {
            return Err(StoreError::NotFound("Group not found".to_string()));
        }
        if inner
            .groups
            .values()
            .any(|g| g.id != id && g.slug == changes.slug)
        {
            return Err(StoreError::UniqueViolation("slug"));
        }

        let group = inner
            .groups
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Group not found".to_string()))?;
        group.title = changes.title;
        group.slug = changes.slug;
        group.description = changes.description;
        Ok(group.clone())
    }

    async fn delete_group(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if inner.groups.remove(&id).is_none() {
            return Err(StoreError::NotFound("Group not found".to_string()));
        }

        // Posts referencing the group are detached, matching ON DELETE SET NULL
        for post in inner.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.values().cloned().collect())
    }

    async fn post(&self, id: i64) -> Result<Post, StoreError> {
        let inner = self.inner.read().await;
        inner
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Post not found".to_string()))
    }

    async fn create_post(&self, new: NewPost) -> Result<Post, StoreError> {
        let mut inner = self.inner.write().await;

        let author = inner.username_of(new.author_id)?;
        if let Some(group_id) = new.group_id {
            if !inner.groups.contains_key(&group_id) {
                return Err(StoreError::MissingRelation("group"));
            }
        }

        let id = inner.next_id();
        let post = Post {
            id,
            text: new.text,
            author,
            author_id: new.author_id,
            image: new.image,
            group_id: new.group_id,
            pub_date: Utc::now(),
        };
        inner.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.posts.contains_key(&id) {
            return Err(StoreError::NotFound("Post not found".to_string()));
        }
        if let Some(group_id) = changes.group_id {
            if !inner.groups.contains_key(&group_id) {
                return Err(StoreError::MissingRelation("group"));
            }
        }

        let post = inner
            .posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Post not found".to_string()))?;
        post.text = changes.text;
        post.image = changes.image;
        post.group_id = changes.group_id;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if inner.posts.remove(&id).is_none() {
            return Err(StoreError::NotFound("Post not found".to_string()));
        }

        // Comments cascade with their post
        inner.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn comment(&self, post_id: i64, id: i64) -> Result<Comment, StoreError> {
        let inner = self.inner.read().await;
        inner
            .comments
            .get(&id)
            .filter(|c| c.post_id == post_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Comment not found".to_string()))
    }

    async fn create_comment(&self, new: NewComment) -> Result<Comment, StoreError> {
        let mut inner = self.inner.write().await;

        let author = inner.username_of(new.author_id)?;
        if !inner.posts.contains_key(&new.post_id) {
            return Err(StoreError::MissingRelation("post"));
        }

        let id = inner.next_id();
        let comment = Comment {
            id,
            text: new.text,
            author,
            author_id: new.author_id,
            created: Utc::now(),
            post_id: new.post_id,
        };
        inner.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        changes: CommentChanges,
    ) -> Result<Comment, StoreError> {
        let mut inner = self.inner.write().await;

        let comment = inner
            .comments
            .get_mut(&id)
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| StoreError::NotFound("Comment not found".to_string()))?;

        comment.text = changes.text;
        Ok(comment.clone())
    }

    async fn delete_comment(&self, post_id: i64, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        let matches = inner
            .comments
            .get(&id)
            .map(|c| c.post_id == post_id)
            .unwrap_or(false);
        if !matches {
            return Err(StoreError::NotFound("Comment not found".to_string()));
        }

        inner.comments.remove(&id);
        Ok(())
    }
}
