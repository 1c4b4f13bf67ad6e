use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{Acknowledgement, Authenticated, ResetPasswordInput, SignupInput},
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking, MAX_PASSWORD_BYTES},
        repo::UserStore,
        repo_types::{EmailTaken, NewUser, User},
        reset::{is_live, issue_grant, link_origin, reset_link},
    },
    clock::Clock,
    config::MailConfig,
    error::ApiError,
    mail::{make_a_nice_email, MailMessage, Mailer},
    state::AppState,
};

const RESET_SUBJECT: &str = "Your Password Reset Token";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_new_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::user_input("Password is required"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::user_input(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Signup, signin, signout and the password-reset flow.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    keys: JwtKeys,
    clock: Arc<dyn Clock>,
    noreply: String,
    frontend_url: String,
    allowed_origins: Vec<String>,
}

impl FromRef<AppState> for CredentialService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.mailer.clone(),
            state.keys.clone(),
            state.clock.clone(),
            &state.config.mail,
        )
    }
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        keys: JwtKeys,
        clock: Arc<dyn Clock>,
        mail: &MailConfig,
    ) -> Self {
        Self {
            users,
            mailer,
            keys,
            clock,
            noreply: mail.noreply.clone(),
            frontend_url: mail.frontend_url.clone(),
            allowed_origins: mail.allowed_origins.clone(),
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> Result<Authenticated<User>, ApiError> {
        let email = normalize_email(&input.email);
        let name = input.name.trim().to_string();

        if name.is_empty() {
            return Err(ApiError::user_input("Name is required"));
        }
        if !is_valid_email(&email) {
            warn!("invalid email");
            return Err(ApiError::user_input("Invalid email"));
        }
        check_new_password(&input.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("email already registered");
            return Err(ApiError::user_input("Email already registered"));
        }

        let password_hash = hash_password_blocking(input.password).await?;

        let user = self
            .users
            .create_user(NewUser {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| {
                if e.is::<EmailTaken>() {
                    ApiError::user_input("Email already registered")
                } else {
                    ApiError::Dependency(e)
                }
            })?;

        info!(user_id = %user.id, "user signed up");
        self.authenticate(user)
    }

    #[instrument(skip(self, password))]
    pub async fn signin(&self, email: &str, password: &str) -> Result<Authenticated<User>, ApiError> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("signin unknown email");
            return Err(ApiError::authentication(format!(
                "No account found for {email}. Sign up!"
            )));
        };

        let valid =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !valid {
            warn!(user_id = %user.id, "signin invalid password");
            return Err(ApiError::authentication("Credentials did not match"));
        }

        info!(user_id = %user.id, "user signed in");
        self.authenticate(user)
    }

    /// Nothing is held server-side; the transport drops the client's token.
    pub fn signout(&self) -> Acknowledgement {
        Acknowledgement::new("Goodbye!")
    }

    /// Stores a fresh reset grant and mails the reset link.
    ///
    /// `origin` is the requesting site; the configured frontend URL is used
    /// when it is absent or not in the allowlist. A delivery failure is
    /// reported to the caller.
    #[instrument(skip(self))]
    pub async fn request_password_reset(
        &self,
        email: &str,
        origin: Option<&str>,
    ) -> Result<Acknowledgement, ApiError> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("reset requested for unknown email");
            return Err(ApiError::authentication(format!(
                "No account found for {email}. Sign up!"
            )));
        };

        let grant = issue_grant(self.clock.now_ms());
        self.users.set_reset_grant(user.id, &grant).await?;

        let origin = link_origin(origin, &self.allowed_origins, &self.frontend_url);
        let link = reset_link(origin, &grant.token);
        let html = make_a_nice_email(&format!(
            "Your Password Reset Token is here!\n\n<a href=\"{link}\">Click Here to Reset</a>"
        ));
        self.mailer
            .send_mail(MailMessage {
                from: self.noreply.clone(),
                to: user.email.clone(),
                subject: RESET_SUBJECT.to_string(),
                html,
            })
            .await?;

        info!(user_id = %user.id, expires_at_ms = grant.expires_at_ms, "reset token issued");
        Ok(Acknowledgement::new("Thanks!"))
    }

    #[instrument(skip(self, input))]
    pub async fn complete_password_reset(
        &self,
        input: ResetPasswordInput,
    ) -> Result<Authenticated<User>, ApiError> {
        if input.password != input.confirm_password {
            return Err(ApiError::user_input("The passwords don't match"));
        }
        check_new_password(&input.password)?;

        let invalid = || ApiError::user_input("This token is either invalid or expired");

        let now_ms = self.clock.now_ms();
        let Some(user) = self
            .users
            .find_by_reset_token(&input.reset_token, now_ms)
            .await?
        else {
            warn!("reset with invalid or expired token");
            return Err(invalid());
        };
        if !user.reset_token_expiry.is_some_and(|exp| is_live(exp, now_ms)) {
            return Err(invalid());
        }

        let password_hash = hash_password_blocking(input.password).await?;
        let Some(updated) = self
            .users
            .complete_reset(user.id, &input.reset_token, &password_hash)
            .await?
        else {
            warn!(user_id = %user.id, "reset token consumed concurrently");
            return Err(invalid());
        };

        info!(user_id = %updated.id, "password reset");
        self.authenticate(updated)
    }

    pub async fn current_user(&self, caller: Option<Uuid>) -> Result<Option<User>, ApiError> {
        match caller {
            Some(id) => Ok(self.users.find_by_id(id).await?),
            None => Ok(None),
        }
    }

    fn authenticate(&self, user: User) -> Result<Authenticated<User>, ApiError> {
        let session_token = self.keys.sign(user.id)?;
        Ok(Authenticated {
            entity: user,
            session_token,
        })
    }
}
