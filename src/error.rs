use async_graphql::ErrorExtensions;
use tracing::error;

/// Errors surfaced to API callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller not logged in, not the owner, or bad credentials.
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    UserInput(String),
    /// Store, mail, hashing or signing failure.
    #[error("dependency failure: {0:#}")]
    Dependency(#[from] anyhow::Error),
}

impl ApiError {
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn user_input(msg: impl Into<String>) -> Self {
        Self::UserInput(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "UNAUTHENTICATED",
            ApiError::UserInput(_) => "BAD_USER_INPUT",
            ApiError::Dependency(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            ApiError::Dependency(e) => {
                error!(error = %format!("{e:#}"), "dependency failure");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let code = self.code();
        async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", code))
    }
}
