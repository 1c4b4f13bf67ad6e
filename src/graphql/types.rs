use async_graphql::SimpleObject;
use uuid::Uuid;

use crate::{
    auth::{dto::Acknowledgement, repo_types::User},
    entries::repo_types::Entry,
};

/// Public part of a user; hashes and reset fields never leave the server.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "User")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Entry")]
pub struct EntryObject {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
}

impl From<Entry> for EntryObject {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            title: e.title,
            user_id: e.user_id,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct SuccessMessage {
    pub message: String,
}

impl From<Acknowledgement> for SuccessMessage {
    fn from(a: Acknowledgement) -> Self {
        Self { message: a.message }
    }
}
