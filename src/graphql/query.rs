use async_graphql::{Context, ErrorExtensions, Object, Result};

use super::{request_context, types::EntryObject, types::PublicUser};
use crate::{auth::services::CredentialService, entries::services::EntryService};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The calling user, or null when not logged in.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<PublicUser>> {
        let service = ctx.data::<CredentialService>()?;
        let user = service
            .current_user(request_context(ctx).user_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(user.map(PublicUser::from))
    }

    /// Entries owned by the caller, newest first.
    async fn entries(&self, ctx: &Context<'_>) -> Result<Vec<EntryObject>> {
        let service = ctx.data::<EntryService>()?;
        let entries = service
            .list_entries(request_context(ctx).user_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(entries.into_iter().map(EntryObject::from).collect())
    }
}
