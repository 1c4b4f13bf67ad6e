use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Entry, EntryChanges, NewEntry};

#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn create_entry(&self, entry: NewEntry) -> anyhow::Result<Entry>;
    async fn find_entry(&self, id: Uuid) -> anyhow::Result<Option<Entry>>;
    async fn update_entry(&self, id: Uuid, changes: EntryChanges) -> anyhow::Result<Option<Entry>>;
    /// Returns the removed entry, if it existed.
    async fn delete_entry(&self, id: Uuid) -> anyhow::Result<Option<Entry>>;
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Entry>>;
}

#[derive(Clone)]
pub struct PgEntryStore {
    db: PgPool,
}

impl PgEntryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn create_entry(&self, entry: NewEntry) -> anyhow::Result<Entry> {
        let row = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (title, user_id)
            VALUES ($1, $2)
            RETURNING id, title, user_id, created_at
            "#,
        )
        .bind(&entry.title)
        .bind(entry.user_id)
        .fetch_one(&self.db)
        .await
        .context("insert entry")?;
        Ok(row)
    }

    async fn find_entry(&self, id: Uuid) -> anyhow::Result<Option<Entry>> {
        let row = sqlx::query_as::<_, Entry>(
            r#"SELECT id, title, user_id, created_at FROM entries WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select entry")?;
        Ok(row)
    }

    async fn update_entry(&self, id: Uuid, changes: EntryChanges) -> anyhow::Result<Option<Entry>> {
        let row = sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries
               SET title = COALESCE($2, title)
             WHERE id = $1
         RETURNING id, title, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .fetch_optional(&self.db)
        .await
        .context("update entry")?;
        Ok(row)
    }

    async fn delete_entry(&self, id: Uuid) -> anyhow::Result<Option<Entry>> {
        let row = sqlx::query_as::<_, Entry>(
            r#"DELETE FROM entries WHERE id = $1 RETURNING id, title, user_id, created_at"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("delete entry")?;
        Ok(row)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, title, user_id, created_at
            FROM entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list entries by user")?;
        Ok(rows)
    }
}
