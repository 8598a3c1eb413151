use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

use crate::config::MailConfig;

/// Outbound notification capability. Delivery is best-effort: callers go
/// through [`send_best_effort`] and never fail a request on a mail error.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub fn from_config(cfg: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if cfg.backend == "smtp" {
        Ok(Arc::new(SmtpMailer::new(cfg)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}

/// Sends and logs a warning on failure instead of propagating it.
pub async fn send_best_effort(mailer: &dyn Mailer, to: &str, subject: &str, body: &str) {
    if let Err(e) = mailer.send(to, subject, body).await {
        warn!(error = %e, %to, subject, "mail delivery failed");
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
            .context("smtp relay")?
            .port(cfg.smtp_port);
        if !cfg.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                cfg.smtp_username.clone(),
                cfg.smtp_password.clone(),
            ));
        }
        let from = cfg
            .from_address
            .parse::<Mailbox>()
            .context("parse MAIL_FROM")?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("parse recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("build message")?;
        self.transport.send(message).await.context("smtp send")?;
        Ok(())
    }
}

/// Default backend outside production: writes the mail to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(%to, subject, body, "mail (log backend)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
            anyhow::bail!("smtp down")
        }
    }

    #[tokio::test]
    async fn log_backend_always_succeeds() {
        let mailer = LogMailer;
        mailer
            .send("someone@example.com", "Hello", "Body")
            .await
            .expect("log mailer should not fail");
    }

    #[tokio::test]
    async fn best_effort_swallows_failures() {
        // Must not panic or propagate.
        send_best_effort(&FailingMailer, "someone@example.com", "Hello", "Body").await;
    }

    #[test]
    fn log_backend_is_selected_unless_smtp() {
        let cfg = MailConfig {
            backend: "log".into(),
            smtp_host: "localhost".into(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "no-reply@campus-events.local".into(),
        };
        assert!(from_config(&cfg).is_ok());
    }
}
