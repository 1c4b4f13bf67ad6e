/// An operation result paired with the session token minted for it.
///
/// The token is not part of the entity; the transport decides how to hand it
/// to the client.
#[derive(Debug, Clone)]
pub struct Authenticated<T> {
    pub entity: T,
    pub session_token: String,
}

/// Fixed acknowledgement payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ResetPasswordInput {
    pub reset_token: String,
    pub password: String,
    pub confirm_password: String,
}
