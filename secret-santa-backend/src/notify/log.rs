use async_trait::async_trait;
use tracing::info;

use super::{Email, Mailer, Messenger, NotifyError};

/// Used when no SMTP server is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        info!(to = %email.to, subject = %email.subject, "email not sent, no smtp configured");
        Ok(())
    }
}

/// Used when no messaging endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(&self, phone: &str, body: &str) -> Result<(), NotifyError> {
        info!(to = %phone, %body, "message not sent, no messaging endpoint configured");
        Ok(())
    }
}
