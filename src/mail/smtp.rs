use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use super::{MailMessage, Mailer};
use crate::config::SmtpConfig;

/// Delivers mail through an SMTP relay (STARTTLS).
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .with_context(|| format!("smtp relay {}", cfg.host))?
            .port(cfg.port);
        if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_mail(&self, message: MailMessage) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(message.from.parse::<Mailbox>().context("parse from address")?)
            .to(message.to.parse::<Mailbox>().context("parse to address")?)
            .subject(message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html)
            .context("build message")?;

        let response = self.transport.send(email).await.context("smtp send")?;
        debug!(code = %response.code(), "mail delivered");
        Ok(())
    }
}
