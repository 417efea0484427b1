use async_trait::async_trait;

use super::{EmailError, EmailMessage, EmailSender};

/// Writes mail to the log. Invite links carry a secret token, so the body only
/// shows up at debug level.
#[derive(Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl EmailSender for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if message.subject.trim().is_empty() {
            return Err(EmailError::Send("refusing to send mail without a subject".to_string()));
        }
        tracing::info!(to = %message.to.as_str(), subject = %message.subject, "mail queued (console)");
        tracing::debug!(from = %message.from, body = %message.body, "mail body");
        Ok(())
    }
}
