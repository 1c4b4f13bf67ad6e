use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // always lower-case
    pub password_hash: String, // bcrypt, never exposed
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<i64>, // unix ms
    pub created_at: OffsetDateTime,
}

/// Fields written on signup.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Reset token and its expiry, always stored and cleared together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGrant {
    pub token: String,
    pub expires_at_ms: i64,
}

/// Returned by `UserStore::create_user` when the email already exists.
#[derive(Debug, thiserror::Error)]
#[error("email already registered")]
pub struct EmailTaken;
