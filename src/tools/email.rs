//! SMTP sending for the `send_email` tool.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::config::schema::EmailConfig;

/// Outbound email capability, injected into the tool registry.
#[async_trait]
pub trait EmailPort: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// SMTP mailer.
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EmailPort for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        use lettre::message::Mailbox;
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

        if self.config.smtp_host.is_empty() {
            anyhow::bail!("SMTP host not configured");
        }
        if self.config.username.is_empty() || self.config.password.is_empty() {
            anyhow::bail!("SMTP credentials not configured");
        }

        let from: Mailbox = self
            .config
            .username
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid from address '{}': {}", self.config.username, e))?;

        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid to address '{}': {}", to, e))?;

        let email = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| anyhow::anyhow!("Failed to build email: {}", e))?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        // Port 465 = implicit TLS, port 587 = STARTTLS.
        let mailer = if self.config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        mailer.send(email).await?;
        debug!("Email sent to {}", to);

        Ok(())
    }
}
