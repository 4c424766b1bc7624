use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail API rejected message with status {0}")]
    Rejected(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match config {
        MailConfig::Http { url, api_key, from } => {
            Arc::new(HttpMailer::new(url.clone(), api_key.clone(), from.clone()))
        }
        MailConfig::Log { from } => Arc::new(LogMailer { from: from.clone() }),
    }
}

/// Posts messages as JSON to a transactional mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": email.to,
                "subject": email.subject,
                "text": email.text,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(MailError::Rejected(response.status().as_u16()))
        }
    }
}

/// Development mailer: writes the message to the log instead of sending it.
pub struct LogMailer {
    pub from: String,
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(from = %self.from, to = %email.to, subject = %email.subject, "mail not sent (log mailer)\n{}", email.text);
        Ok(())
    }
}

/// Sends on a spawned task. Failures are logged and never reach the caller.
pub fn send_in_background(mailer: Arc<dyn Mailer>, email: Email) {
    tokio::spawn(async move {
        let to = email.to.clone();
        if let Err(e) = mailer.send(email).await {
            tracing::warn!(%to, error = %e, "failed to send email");
        }
    });
}

pub fn welcome_email(to: &str, first_name: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Welcome to My Instructor".to_string(),
        text: format!(
            "Hi {},\n\nYour instructor account has been created.\nSign in with: {}\n\nYou can update your profile, availability and closed days once signed in.",
            first_name, to
        ),
    }
}

pub fn password_reset_email(to: &str, first_name: &str, token: &str, ttl_secs: i64) -> Email {
    Email {
        to: to.to_string(),
        subject: "Password reset".to_string(),
        text: format!(
            "Hi {},\n\nUse this code to reset your password: {}\nIt expires in {} seconds.\n\nIf you did not ask for a reset you can ignore this email.",
            first_name, token, ttl_secs
        ),
    }
}
