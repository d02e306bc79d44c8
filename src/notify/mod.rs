use anyhow::Result;

use crate::config::MailConfig;

/// Fire-and-forget notification channel
#[async_trait::async_trait]
pub trait MailService: Send + Sync {
    async fn send(&self, subject: &str, message: &str) -> Result<()>;
}

/// Mail service for development: writes the mail to the log
#[derive(Debug, Clone)]
pub struct LocalMailService {
    mail_to: String,
    mail_from: String,
}

impl LocalMailService {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            mail_to: config.mail_to.clone(),
            mail_from: config.mail_from.clone(),
        }
    }
}

#[async_trait::async_trait]
impl MailService for LocalMailService {
    async fn send(&self, subject: &str, message: &str) -> Result<()> {
        log::info!(
            "Mail from {} to {}, with LocalMailService",
            self.mail_from,
            self.mail_to
        );
        log::info!("Subject: {}", subject);
        log::info!("Message: {}", message);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CloudMailService {
    mail_to: String,
    mail_from: String,
}

impl CloudMailService {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            mail_to: config.mail_to.clone(),
            mail_from: config.mail_from.clone(),
        }
    }
}

#[async_trait::async_trait]
impl MailService for CloudMailService {
    async fn send(&self, subject: &str, message: &str) -> Result<()> {
        log::info!(
            "Mail from {} to {}, with CloudMailService",
            self.mail_from,
            self.mail_to
        );
        log::info!("Subject: {}", subject);
        log::info!("Message: {}", message);
        Ok(())
    }
}

/// Subject and body sent after a point of interest was deleted
pub fn point_of_interest_deleted(name: &str, id: crate::model::Id) -> (String, String) {
    (
        "Point of interest deleted".to_string(),
        format!("Point of interest {} with id {} has been deleted", name, id),
    )
}
