use async_graphql::{Context, ErrorExtensions, Object, Result};
use axum::http::header::{ACCESS_CONTROL_EXPOSE_HEADERS, SET_COOKIE};
use uuid::Uuid;

use super::{
    request_context,
    types::{EntryObject, PublicUser, SuccessMessage},
};
use crate::{
    auth::{
        dto::{Authenticated, ResetPasswordInput, SignupInput},
        extractors::TOKEN_HEADER,
        repo_types::User,
        services::CredentialService,
    },
    entries::{repo_types::EntryChanges, services::EntryService},
};

const CLEAR_TOKEN_COOKIE: &str = "token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";

/// Hands the session token to the client via the `token` response header.
fn expose_session(ctx: &Context<'_>, authenticated: Authenticated<User>) -> PublicUser {
    ctx.insert_http_header(ACCESS_CONTROL_EXPOSE_HEADERS, TOKEN_HEADER);
    ctx.insert_http_header(TOKEN_HEADER, authenticated.session_token);
    authenticated.entity.into()
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_entry(&self, ctx: &Context<'_>, title: String) -> Result<EntryObject> {
        let service = ctx.data::<EntryService>()?;
        let entry = service
            .create_entry(request_context(ctx).user_id, &title)
            .await
            .map_err(|e| e.extend())?;
        Ok(entry.into())
    }

    /// Only `title` can change; the owner is fixed.
    async fn update_entry(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        title: Option<String>,
    ) -> Result<EntryObject> {
        let service = ctx.data::<EntryService>()?;
        let entry = service
            .update_entry(request_context(ctx).user_id, id, EntryChanges { title })
            .await
            .map_err(|e| e.extend())?;
        Ok(entry.into())
    }

    async fn delete_entry(&self, ctx: &Context<'_>, id: Uuid) -> Result<EntryObject> {
        let service = ctx.data::<EntryService>()?;
        let entry = service
            .delete_entry(request_context(ctx).user_id, id)
            .await
            .map_err(|e| e.extend())?;
        Ok(entry.into())
    }

    async fn signup(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        password: String,
    ) -> Result<PublicUser> {
        let service = ctx.data::<CredentialService>()?;
        let authenticated = service
            .signup(SignupInput {
                name,
                email,
                password,
            })
            .await
            .map_err(|e| e.extend())?;
        Ok(expose_session(ctx, authenticated))
    }

    async fn signin(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<PublicUser> {
        let service = ctx.data::<CredentialService>()?;
        let authenticated = service
            .signin(&email, &password)
            .await
            .map_err(|e| e.extend())?;
        Ok(expose_session(ctx, authenticated))
    }

    async fn signout(&self, ctx: &Context<'_>) -> Result<SuccessMessage> {
        let service = ctx.data::<CredentialService>()?;
        ctx.insert_http_header(SET_COOKIE, CLEAR_TOKEN_COOKIE);
        Ok(service.signout().into())
    }

    async fn request_reset(&self, ctx: &Context<'_>, email: String) -> Result<SuccessMessage> {
        let service = ctx.data::<CredentialService>()?;
        let origin = request_context(ctx).origin;
        let ack = service
            .request_password_reset(&email, origin.as_deref())
            .await
            .map_err(|e| e.extend())?;
        Ok(ack.into())
    }

    async fn reset_password(
        &self,
        ctx: &Context<'_>,
        reset_token: String,
        password: String,
        confirm_password: String,
    ) -> Result<PublicUser> {
        let service = ctx.data::<CredentialService>()?;
        let authenticated = service
            .complete_password_reset(ResetPasswordInput {
                reset_token,
                password,
                confirm_password,
            })
            .await
            .map_err(|e| e.extend())?;
        Ok(expose_session(ctx, authenticated))
    }
}
