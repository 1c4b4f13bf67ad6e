//! In-memory collaborators for unit tests.

use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::UserStore,
        repo_types::{EmailTaken, NewUser, ResetGrant, User},
        reset::is_live,
        services::CredentialService,
    },
    clock::Clock,
    config::AppConfig,
    entries::{
        repo::EntryStore,
        repo_types::{Entry, EntryChanges, NewEntry},
        services::EntryService,
    },
    mail::{MailMessage, Mailer},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn by_email(&self, email: &str) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.email == email).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(EmailTaken.into());
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            reset_token: None,
            reset_token_expiry: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.by_email(email))
    }

    async fn set_reset_grant(&self, user_id: Uuid, grant: &ResetGrant) -> anyhow::Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == user_id) {
            u.reset_token = Some(grant.token.clone());
            u.reset_token_expiry = Some(grant.expires_at_ms);
        }
        Ok(())
    }

    async fn find_by_reset_token(&self, token: &str, now_ms: i64) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| {
                u.reset_token.as_deref() == Some(token)
                    && u.reset_token_expiry.is_some_and(|exp| is_live(exp, now_ms))
            })
            .cloned())
    }

    async fn complete_reset(
        &self,
        user_id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let Some(u) = users
            .iter_mut()
            .find(|u| u.id == user_id && u.reset_token.as_deref() == Some(token))
        else {
            return Ok(None);
        };
        u.password_hash = password_hash.to_string();
        u.reset_token = None;
        u.reset_token_expiry = None;
        Ok(Some(u.clone()))
    }
}

#[derive(Default)]
pub struct MemoryEntryStore {
    entries: Mutex<Vec<Entry>>,
}

impl MemoryEntryStore {
    pub fn get(&self, id: Uuid) -> Option<Entry> {
        self.entries.lock().unwrap().iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn create_entry(&self, entry: NewEntry) -> anyhow::Result<Entry> {
        let created = Entry {
            id: Uuid::new_v4(),
            title: entry.title,
            user_id: entry.user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.entries.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_entry(&self, id: Uuid) -> anyhow::Result<Option<Entry>> {
        Ok(self.get(id))
    }

    async fn update_entry(&self, id: Uuid, changes: EntryChanges) -> anyhow::Result<Option<Entry>> {
        let mut entries = self.entries.lock().unwrap();
        let Some(e) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            e.title = title;
        }
        Ok(Some(e.clone()))
    }

    async fn delete_entry(&self, id: Uuid) -> anyhow::Result<Option<Entry>> {
        let mut entries = self.entries.lock().unwrap();
        let pos = entries.iter().position(|e| e.id == id);
        Ok(pos.map(|i| entries.remove(i)))
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Entry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Records every message; can be switched to fail delivery.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<MailMessage>>,
    failing: AtomicBool,
}

impl Outbox {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_delivery(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send_mail(&self, message: MailMessage) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("relay refused connection");
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[derive(Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn at(ms: i64) -> Self {
        Self(AtomicI64::new(ms))
    }

    pub fn set(&self, ms: i64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Services wired to in-memory collaborators, with handles to inspect them.
pub struct Harness {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<MemoryUserStore>,
    pub entries: Arc<MemoryEntryStore>,
    pub outbox: Arc<Outbox>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        let config = Arc::new(AppConfig::for_tests());
        Self {
            keys: JwtKeys::from(&config.jwt),
            config,
            users: Arc::new(MemoryUserStore::default()),
            entries: Arc::new(MemoryEntryStore::default()),
            outbox: Arc::new(Outbox::default()),
            clock: Arc::new(FixedClock::at(1_000)),
        }
    }

    pub fn credentials(&self) -> CredentialService {
        CredentialService::new(
            self.users.clone(),
            self.mailer(),
            self.keys.clone(),
            self.clock.clone(),
            &self.config.mail,
        )
    }

    pub fn entry_service(&self) -> EntryService {
        EntryService::new(self.entries.clone())
    }

    fn mailer(&self) -> Arc<dyn Mailer> {
        self.outbox.clone()
    }
}
