use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;

/// Name of the header (and cookie) carrying the session token.
pub const TOKEN_HEADER: &str = "token";

/// Caller identity resolved from the session token, if any.
///
/// A missing or invalid token yields an anonymous caller; resolvers decide
/// whether they need one.
pub struct Caller(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Caller(None));
        };

        let keys = JwtKeys::from_ref(state);
        match keys.verify(&token) {
            Ok(claims) => Ok(Caller(Some(claims.user_id))),
            Err(e) => {
                warn!(error = %e, "ignoring invalid session token");
                Ok(Caller(None))
            }
        }
    }
}

/// Token from the `token` header, an `Authorization: Bearer` header, or the
/// `token` cookie, in that order.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(v) = headers.get(TOKEN_HEADER).and_then(|h| h.to_str().ok()) {
        if !v.is_empty() {
            return Some(v.to_string());
        }
    }

    if let Some(v) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").or_else(|| auth.strip_prefix("bearer ")))
    {
        return Some(v.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_HEADER && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
