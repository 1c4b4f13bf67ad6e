use std::sync::Arc;

use tracing::info;

use crate::auth::{jwt::JwtKeys, repo::PgUserStore, repo::UserStore};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db;
use crate::entries::repo::{EntryStore, PgEntryStore};
use crate::mail::{smtp::SmtpMailer, LogMailer, Mailer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub entries: Arc<dyn EntryStore>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await;

        let mailer: Arc<dyn Mailer> = match &config.mail.smtp {
            Some(smtp) => {
                info!(host = %smtp.host, port = smtp.port, "using smtp relay");
                Arc::new(SmtpMailer::new(smtp)?)
            }
            None => {
                info!("SMTP_HOST not set; mail goes to the log");
                Arc::new(LogMailer)
            }
        };

        Ok(Self {
            keys: JwtKeys::from(&config.jwt),
            users: Arc::new(PgUserStore::new(pool.clone())),
            entries: Arc::new(PgEntryStore::new(pool.clone())),
            config,
            mailer,
            clock: Arc::new(SystemClock),
        })
    }

    #[cfg(test)]
    pub fn fake(h: &crate::testing::Harness) -> Self {
        Self {
            config: h.config.clone(),
            keys: h.keys.clone(),
            users: h.users.clone(),
            entries: h.entries.clone(),
            mailer: h.outbox.clone(),
            clock: h.clock.clone(),
        }
    }
}
