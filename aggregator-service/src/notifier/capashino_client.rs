use std::time::Duration;
use thiserror::Error;

/// `POST /api/notifications` client.
///
/// Delivery failures are reported as `Ok(false)` to the caller (the outbox
/// worker), not as an `Err`, except for genuinely unexpected transport
/// failures which surface as [`NotifierError`] and are treated the same way
/// by the worker (increment retry).
pub struct CapashinoClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notifier transport error: {0}")]
    Transport(String),
}

impl CapashinoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("notifier HTTP client configuration is valid");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Returns `Ok(true)` on 201, `Ok(false)` on any other HTTP status
    /// (classified downstream as a retry by the outbox worker).
    pub async fn send_notification(
        &self,
        message: &str,
        reference_id: &str,
        idempotency_key: &str,
    ) -> Result<bool, NotifierError> {
        let url = format!("{}/api/notifications", self.base_url);
        let body = serde_json::json!({
            "message": message,
            "reference_id": reference_id,
            "idempotency_key": idempotency_key,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifierError::Transport(e.to_string()))?;

        Ok(response.status().as_u16() == 201)
    }
}
