use async_graphql::{Context, EmptySubscription, Schema};
use axum::extract::FromRef;
use uuid::Uuid;

use crate::{auth::services::CredentialService, entries::services::EntryService, state::AppState};

pub mod handlers;
mod mutation;
mod query;
pub mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Per-request data attached by the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<Uuid>,
    pub origin: Option<String>,
}

pub(crate) fn request_context(ctx: &Context<'_>) -> RequestContext {
    ctx.data_opt::<RequestContext>().cloned().unwrap_or_default()
}

pub fn build_schema(state: &AppState) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(CredentialService::from_ref(state))
        .data(EntryService::from_ref(state))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use async_graphql::Request;
    use serde_json::Value;

    fn schema(h: &Harness) -> AppSchema {
        build_schema(&AppState::fake(h))
    }

    async fn run(schema: &AppSchema, query: &str, ctx: RequestContext) -> async_graphql::Response {
        schema.execute(Request::new(query).data(ctx)).await
    }

    fn error_code(resp: &async_graphql::Response) -> String {
        let json = serde_json::to_value(resp).unwrap();
        json["errors"][0]["extensions"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    const SIGNUP: &str =
        r#"mutation { signup(name: "Ada", email: "A@B.com", password: "pw123456") { id email } }"#;

    #[tokio::test]
    async fn signup_exposes_token_header_not_body() {
        let h = Harness::new();
        let schema = schema(&h);
        let resp = run(&schema, SIGNUP, RequestContext::default()).await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);

        let token = resp.http_headers.get("token").unwrap().to_str().unwrap();
        let claims = h.keys.verify(token).unwrap();
        assert_eq!(
            resp.http_headers
                .get("access-control-expose-headers")
                .unwrap()
                .to_str()
                .unwrap(),
            "token"
        );

        let data = serde_json::to_value(&resp.data).unwrap();
        assert_eq!(data["signup"]["email"], "a@b.com");
        assert_eq!(data["signup"]["id"], claims.user_id.to_string());
        assert!(data["signup"].get("token").is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthenticated() {
        let h = Harness::new();
        let schema = schema(&h);
        run(&schema, SIGNUP, RequestContext::default()).await;

        let resp = run(
            &schema,
            r#"mutation { signin(email: "a@b.com", password: "nope") { id } }"#,
            RequestContext::default(),
        )
        .await;
        assert_eq!(error_code(&resp), "UNAUTHENTICATED");
        assert!(resp.http_headers.get("token").is_none());
    }

    #[tokio::test]
    async fn signout_clears_cookie() {
        let h = Harness::new();
        let resp = run(
            &schema(&h),
            "mutation { signout { message } }",
            RequestContext::default(),
        )
        .await;
        let data = serde_json::to_value(&resp.data).unwrap();
        assert_eq!(data["signout"]["message"], "Goodbye!");
        let cookie = resp.http_headers.get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn reset_flow_uses_request_origin() {
        let h = Harness::new();
        let schema = schema(&h);
        run(&schema, SIGNUP, RequestContext::default()).await;

        let resp = run(
            &schema,
            r#"mutation { requestReset(email: "a@b.com") { message } }"#,
            RequestContext {
                user_id: None,
                origin: Some("https://journal.example".into()),
            },
        )
        .await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        let token = h.users.by_email("a@b.com").unwrap().reset_token.unwrap();
        assert!(h.outbox.sent()[0]
            .html
            .contains(&format!("https://journal.example/reset-password/{token}")));

        let mismatch = format!(
            r#"mutation {{ resetPassword(resetToken: "{token}", password: "a", confirmPassword: "b") {{ id }} }}"#
        );
        let resp = run(&schema, &mismatch, RequestContext::default()).await;
        assert_eq!(error_code(&resp), "BAD_USER_INPUT");

        let ok = format!(
            r#"mutation {{ resetPassword(resetToken: "{token}", password: "fresh", confirmPassword: "fresh") {{ email }} }}"#
        );
        let resp = run(&schema, &ok, RequestContext::default()).await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        assert!(resp.http_headers.get("token").is_some());

        let resp = run(&schema, &ok, RequestContext::default()).await;
        assert_eq!(error_code(&resp), "BAD_USER_INPUT");
    }

    #[tokio::test]
    async fn entry_mutations_respect_ownership() {
        let h = Harness::new();
        let schema = schema(&h);
        let owner = RequestContext {
            user_id: Some(Uuid::new_v4()),
            origin: None,
        };
        let stranger = RequestContext {
            user_id: Some(Uuid::new_v4()),
            origin: None,
        };

        let resp = run(
            &schema,
            r#"mutation { createEntry(title: "x") { id } }"#,
            RequestContext::default(),
        )
        .await;
        assert_eq!(error_code(&resp), "UNAUTHENTICATED");

        let resp = run(
            &schema,
            r#"mutation { createEntry(title: "Day one") { id userId } }"#,
            owner.clone(),
        )
        .await;
        let data = serde_json::to_value(&resp.data).unwrap();
        let id = data["createEntry"]["id"].as_str().unwrap().to_string();
        assert_eq!(
            data["createEntry"]["userId"],
            Value::String(owner.user_id.unwrap().to_string())
        );

        let delete = format!(r#"mutation {{ deleteEntry(id: "{id}") {{ id }} }}"#);
        let resp = run(&schema, &delete, stranger).await;
        assert_eq!(error_code(&resp), "UNAUTHENTICATED");

        let update = format!(r#"mutation {{ updateEntry(id: "{id}", title: "Day 1") {{ title }} }}"#);
        let resp = run(&schema, &update, owner.clone()).await;
        let data = serde_json::to_value(&resp.data).unwrap();
        assert_eq!(data["updateEntry"]["title"], "Day 1");

        let resp = run(&schema, &delete, owner.clone()).await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        let resp = run(&schema, "{ entries { id } }", owner).await;
        let data = serde_json::to_value(&resp.data).unwrap();
        assert_eq!(data["entries"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn me_is_null_for_anonymous() {
        let h = Harness::new();
        let resp = run(&schema(&h), "{ me { id } }", RequestContext::default()).await;
        let data = serde_json::to_value(&resp.data).unwrap();
        assert!(data["me"].is_null());
    }
}
