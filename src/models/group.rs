use serde::Serialize;
use sqlx::FromRow;

/// Post category. Groups have no owner; the collection endpoint refuses
/// creation by design, so new groups only come from administrative seeding.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Full replacement applied by update; PATCH merges into this in the handler.
#[derive(Debug, Clone)]
pub struct GroupChanges {
    pub title: String,
    pub slug: String,
    pub description: String,
}
