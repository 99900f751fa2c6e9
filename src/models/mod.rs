pub mod comment;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentChanges, NewComment};
pub use group::{Group, GroupChanges, NewGroup};
pub use post::{NewPost, Post, PostChanges};
pub use user::{NewUser, User};
