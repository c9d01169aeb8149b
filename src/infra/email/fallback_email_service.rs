use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Tries each provider in order; with no providers configured the message is skipped.
pub struct FallbackEmailService {
    providers: Vec<(&'static str, Arc<dyn EmailService>)>,
}

impl FallbackEmailService {
    pub fn new(providers: Vec<(&'static str, Arc<dyn EmailService>)>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|(name, _)| *name).collect()
    }
}

#[async_trait]
impl EmailService for FallbackEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        if self.providers.is_empty() {
            warn!(recipient = %recipient, "No email provider configured, skipping delivery of '{}'", subject);
            return Ok(());
        }

        let mut last_error = None;
        for (name, provider) in &self.providers {
            match provider.send(recipient, subject, html_body).await {
                Ok(()) => {
                    info!(provider = %name, recipient = %recipient, "Email delivered");
                    return Ok(());
                }
                Err(e) => {
                    warn!(provider = %name, "Email provider failed, trying next: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(AppError::Internal))
    }
}
