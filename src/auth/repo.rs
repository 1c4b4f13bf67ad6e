use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{EmailTaken, NewUser, ResetGrant, User};
use crate::db::is_unique_violation;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, reset_token, reset_token_expiry, created_at";

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`EmailTaken`] when the email is already registered.
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn set_reset_grant(&self, user_id: Uuid, grant: &ResetGrant) -> anyhow::Result<()>;
    /// Finds the user holding `token` whose grant has not expired at `now_ms`.
    async fn find_by_reset_token(&self, token: &str, now_ms: i64) -> anyhow::Result<Option<User>>;
    /// Sets the new password and clears the reset grant in one write.
    /// Returns `None` if the grant was consumed in the meantime.
    async fn complete_reset(
        &self,
        user_id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    anyhow::Error::new(EmailTaken)
                } else {
                    anyhow::Error::new(e).context("insert user")
                }
            })
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("select user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("select user by email")?;
        Ok(user)
    }

    async fn set_reset_grant(&self, user_id: Uuid, grant: &ResetGrant) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET reset_token = $2, reset_token_expiry = $3
             WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&grant.token)
        .bind(grant.expires_at_ms)
        .execute(&self.db)
        .await
        .context("store reset grant")?;
        Ok(())
    }

    async fn find_by_reset_token(&self, token: &str, now_ms: i64) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1 AND reset_token_expiry >= $2 LIMIT 1"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token)
            .bind(now_ms)
            .fetch_optional(&self.db)
            .await
            .context("select user by reset token")?;
        Ok(user)
    }

    async fn complete_reset(
        &self,
        user_id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "UPDATE users \
                SET password_hash = $3, reset_token = NULL, reset_token_expiry = NULL \
              WHERE id = $1 AND reset_token = $2 \
          RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(token)
            .bind(password_hash)
            .fetch_optional(&self.db)
            .await
            .context("complete password reset")?;
        Ok(user)
    }
}
