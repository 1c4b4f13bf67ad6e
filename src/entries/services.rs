use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    repo::EntryStore,
    repo_types::{Entry, EntryChanges, NewEntry},
};
use crate::{error::ApiError, state::AppState};

const NOT_LOGGED_IN: &str = "You are not logged in";
const NOT_OWNER: &str = "You don't have permission to do that!";

/// Entry mutations, scoped to the calling user.
#[derive(Clone)]
pub struct EntryService {
    entries: Arc<dyn EntryStore>,
}

impl FromRef<AppState> for EntryService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.entries.clone())
    }
}

fn require_caller(caller: Option<Uuid>) -> Result<Uuid, ApiError> {
    caller.ok_or_else(|| ApiError::authentication(NOT_LOGGED_IN))
}

fn clean_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::user_input("Title is required"));
    }
    Ok(title.to_string())
}

impl EntryService {
    pub fn new(entries: Arc<dyn EntryStore>) -> Self {
        Self { entries }
    }

    #[instrument(skip(self, title))]
    pub async fn create_entry(&self, caller: Option<Uuid>, title: &str) -> Result<Entry, ApiError> {
        let user_id = require_caller(caller)?;
        let title = clean_title(title)?;
        let entry = self.entries.create_entry(NewEntry { title, user_id }).await?;
        info!(entry_id = %entry.id, %user_id, "entry created");
        Ok(entry)
    }

    /// Only the owner may update, and only whitelisted fields change.
    #[instrument(skip(self, changes))]
    pub async fn update_entry(
        &self,
        caller: Option<Uuid>,
        id: Uuid,
        changes: EntryChanges,
    ) -> Result<Entry, ApiError> {
        let user_id = require_caller(caller)?;
        self.owned_entry(user_id, id).await?;

        let changes = EntryChanges {
            title: changes.title.as_deref().map(clean_title).transpose()?,
        };
        let entry = self
            .entries
            .update_entry(id, changes)
            .await?
            .ok_or_else(|| ApiError::user_input("Entry not found"))?;
        info!(entry_id = %entry.id, %user_id, "entry updated");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn delete_entry(&self, caller: Option<Uuid>, id: Uuid) -> Result<Entry, ApiError> {
        // anonymous callers fall through to the ownership error
        let user_id = caller.ok_or_else(|| ApiError::authentication(NOT_OWNER))?;
        self.owned_entry(user_id, id).await?;

        let entry = self
            .entries
            .delete_entry(id)
            .await?
            .ok_or_else(|| ApiError::user_input("Entry not found"))?;
        info!(entry_id = %entry.id, %user_id, "entry deleted");
        Ok(entry)
    }

    pub async fn list_entries(&self, caller: Option<Uuid>) -> Result<Vec<Entry>, ApiError> {
        let user_id = require_caller(caller)?;
        Ok(self.entries.list_by_user(user_id).await?)
    }

    async fn owned_entry(&self, user_id: Uuid, id: Uuid) -> Result<Entry, ApiError> {
        let entry = self
            .entries
            .find_entry(id)
            .await?
            .ok_or_else(|| ApiError::user_input("Entry not found"))?;
        if entry.user_id != user_id {
            warn!(entry_id = %id, %user_id, owner = %entry.user_id, "ownership check failed");
            return Err(ApiError::authentication(NOT_OWNER));
        }
        Ok(entry)
    }
}
