use async_trait::async_trait;
use tracing::info;

pub mod smtp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound mail channel.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mail(&self, message: MailMessage) -> anyhow::Result<()>;
}

/// Logs the envelope of each message instead of delivering it. Used when no
/// SMTP relay is configured. The body is never logged; it carries reset links.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_mail(&self, message: MailMessage) -> anyhow::Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body_bytes = message.html.len(),
            "mail not delivered (no smtp relay configured)"
        );
        Ok(())
    }
}

/// Wraps `text` in the standard HTML email layout.
pub fn make_a_nice_email(text: &str) -> String {
    format!(
        r#"<div class="email" style="
        border: 1px solid black;
        padding: 20px;
        font-family: sans-serif;
        line-height: 2;
        font-size: 20px;
    ">
    <h2>Hello There!</h2>
    <p>{text}</p>

    <p>😘, Entrybook</p>
    </div>"#
    )
}
