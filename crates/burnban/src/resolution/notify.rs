use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::domain::OutcomeEvent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Outbound hook for resolved outcomes (e.g. a Power Automate flow).
#[async_trait]
pub trait NotificationForwarder: Send + Sync {
    async fn forward(&self, event: &OutcomeEvent) -> Result<(), NotifyError>;
}

/// Posts each event as JSON to a webhook. Without a URL every event is dropped.
#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookForwarder {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationForwarder for WebhookForwarder {
    async fn forward(&self, event: &OutcomeEvent) -> Result<(), NotifyError> {
        let Some(url) = self.url.as_deref() else {
            debug!("no notification sink configured; skipping");
            return Ok(());
        };

        self.client
            .post(url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
