use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Entry record; `user_id` is fixed at creation.
#[derive(Debug, Clone, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub title: String,
    pub user_id: Uuid,
}

/// Fields an update may touch. Ownership is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub title: Option<String>,
}
