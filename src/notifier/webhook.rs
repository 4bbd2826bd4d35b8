//! A `NotificationSink` that POSTs alerts to a configured webhook.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use url::Url;

use super::traits::{NotificationSink, SinkError};

/// Delivers alerts as JSON payloads to a single webhook endpoint.
pub struct WebhookSink {
    url: Url,
    client: ClientWithMiddleware,
}

impl WebhookSink {
    /// Creates a new `WebhookSink` targeting the given URL.
    pub fn new(url: Url, client: ClientWithMiddleware) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    #[tracing::instrument(skip(self, text), level = "debug")]
    async fn send(&self, subscriber_id: &str, text: &str) -> Result<(), SinkError> {
        let payload = json!({
            "subscriber_id": subscriber_id,
            "text": text,
        });

        let response = self.client.post(self.url.clone()).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::BadStatus(status));
        }

        tracing::debug!(subscriber_id, "Notification delivered.");
        Ok(())
    }
}
