use std::sync::Arc;

use crate::app::domain::Email;

/// Message to be sent via any email implementation.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: Email,
    pub subject: String,
    pub body: String,
    pub from: String,
}

impl EmailMessage {
    pub fn new(to: Email, subject: String, body: String, from: impl Into<String>) -> Self {
        Self {
            to,
            subject,
            body,
            from: from.into(),
        }
    }
}

/// Outbound email. Swappable per environment; delivery providers live
/// outside this crate.
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Send error: {0}")]
    Send(String),
}

pub use console::ConsoleMailer;

mod console;

/// Build the email sender from config.
pub fn from_config(config: &crate::app::config::Config) -> Result<Arc<dyn EmailSender>, EmailError> {
    match config.mail_adapter.as_str() {
        "console" => Ok(Arc::new(ConsoleMailer)),
        other => Err(EmailError::Config(format!("Unknown MAIL_ADAPTER: {}", other))),
    }
}

/// Send without waiting. Failures are logged and never reach the caller.
pub fn dispatch(sender: Arc<dyn EmailSender>, message: EmailMessage) {
    tokio::spawn(async move {
        if let Err(err) = sender.send(&message).await {
            tracing::warn!(%err, to = %message.to.as_str(), "email dispatch failed");
        }
    });
}
