use crate::models::{ProviderEventsPage, ProviderPlacePayload};
use crate::provider::ProviderError;
use resilience::retry::{with_retry, RetryConfig, RetryError};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// Retry-aware HTTP client for the upstream events provider.
///
/// Each GET/DELETE retries up to `max_retries` times with backoff
/// `backoff_factor * 2^attempt`, capped at 5s. `register` is also retried on
/// transport errors only; the caller owns idempotency (see `pipeline::create`).
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct SeatsResponse {
    seats: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    ticket_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct UnregisterResponse {
    success: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityResponse {
    pub status: String,
}

impl ProviderClient {
    pub fn new(base_url: impl Into<String>, api_key: &str, max_retries: u32, backoff_factor: f64) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = reqwest::header::HeaderValue::from_str(api_key) {
            headers.insert("x-api-key", value);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .expect("provider HTTP client configuration is valid");

        let retry = RetryConfig {
            max_retries,
            initial_backoff: Duration::from_secs_f64(backoff_factor),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        Self {
            http,
            base_url: base_url.into(),
            retry,
        }
    }

    /// `GET /api/events/?changed_at=...` using either a date filter or an
    /// opaque `next` cursor URL.
    pub async fn get_events_page(
        &self,
        changed_at: Option<&str>,
        next_url: Option<&str>,
    ) -> Result<ProviderEventsPage, ProviderError> {
        let url = match next_url {
            Some(next) => next.to_string(),
            None => {
                let mut url = format!("{}/api/events/", self.base_url);
                if let Some(changed_at) = changed_at {
                    url = format!("{url}?changed_at={changed_at}");
                }
                url
            }
        };

        self.get_json(&url).await
    }

    /// `GET /api/events/{id}/seats/`.
    pub async fn get_event_seats(&self, event_id: Uuid) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/events/{}/seats/", self.base_url, event_id);
        let body: SeatsResponse = self.get_json(&url).await?;
        Ok(body.seats)
    }

    /// `POST /api/events/{id}/register/`.
    pub async fn register(
        &self,
        event_id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
        seat: &str,
    ) -> Result<Uuid, ProviderError> {
        let url = format!("{}/api/events/{}/register/", self.base_url, event_id);
        let body = serde_json::json!({
            "event_id": event_id,
            "first_name": first_name,
            "last_name": last_name,
            "email": email,
            "seat": seat,
        });

        let result: Result<Result<RegisterResponse, ProviderError>, RetryError<String>> =
            with_retry(self.retry.clone(), || {
                let http = self.http.clone();
                let url = url.clone();
                let body = body.clone();
                async move { Self::post_attempt::<RegisterResponse>(&http, &url, &body).await }
            })
            .await;

        let response = Self::unwrap_retry(result)?;
        response.ticket_id.ok_or(ProviderError::UnexpectedResponse)
    }

    /// `DELETE /api/events/{id}/unregister/`.
    pub async fn unregister(&self, event_id: Uuid, ticket_id: Uuid) -> Result<bool, ProviderError> {
        let url = format!("{}/api/events/{}/unregister/", self.base_url, event_id);
        let body = serde_json::json!({ "ticket_id": ticket_id });

        let result: Result<Result<UnregisterResponse, ProviderError>, RetryError<String>> =
            with_retry(self.retry.clone(), || {
                let http = self.http.clone();
                let url = url.clone();
                let body = body.clone();
                async move { Self::delete_attempt::<UnregisterResponse>(&http, &url, &body).await }
            })
            .await;

        let response = Self::unwrap_retry(result)?;
        response.success.ok_or(ProviderError::UnexpectedResponse)
    }

    pub async fn check_availability(&self) -> Result<AvailabilityResponse, ProviderError> {
        let url = format!("{}/api/events/availability/", self.base_url);
        self.get_json(&url).await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ProviderError> {
        let result: Result<Result<T, ProviderError>, RetryError<String>> =
            with_retry(self.retry.clone(), || {
                let http = self.http.clone();
                let url = url.to_string();
                async move { Self::get_attempt::<T>(&http, &url).await }
            })
            .await;

        Self::unwrap_retry(result)
    }

    /// One GET attempt. Returns `Ok(Ok(body))` on success, `Ok(Err(permanent))`
    /// for a non-retryable status (no further retries needed), and `Err(..)`
    /// for a transport error or retryable status (drives another attempt).
    async fn get_attempt<T: for<'de> Deserialize<'de>>(
        http: &reqwest::Client,
        url: &str,
    ) -> Result<Result<T, ProviderError>, String> {
        let response = match http.get(url).send().await {
            Ok(r) => r,
            Err(e) => return Err(e.to_string()),
        };

        Self::classify_response(response).await
    }

    /// One POST attempt for `register`. Unlike `get_attempt`/`delete_attempt`,
    /// any response the provider actually sends back — success, a retryable
    /// status, or a permanent error — is terminal: the provider is the sole
    /// authority on seat assignment, so retrying a call it already received
    /// could double-book a seat. Only a transport failure (no response
    /// received at all) drives another attempt.
    async fn post_attempt<T: for<'de> Deserialize<'de>>(
        http: &reqwest::Client,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<Result<T, ProviderError>, String> {
        let response = match http.post(url).json(body).send().await {
            Ok(r) => r,
            Err(e) => return Err(e.to_string()),
        };

        Self::classify_response_no_retry(response).await
    }

    async fn delete_attempt<T: for<'de> Deserialize<'de>>(
        http: &reqwest::Client,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<Result<T, ProviderError>, String> {
        let response = match http.delete(url).json(body).send().await {
            Ok(r) => r,
            Err(e) => return Err(e.to_string()),
        };

        Self::classify_response(response).await
    }

    async fn classify_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<Result<T, ProviderError>, String> {
        let status = response.status();

        if status.is_success() {
            return match response.json::<T>().await {
                Ok(body) => Ok(Ok(body)),
                Err(_) => Ok(Err(ProviderError::UnexpectedResponse)),
            };
        }

        let status_code = status.as_u16();
        if ProviderError::is_retryable_status(status_code) {
            return Err(format!("retryable provider status {status_code}"));
        }

        let message = response.text().await.unwrap_or_default();
        Ok(Err(ProviderError::Permanent {
            status: status_code,
            message,
        }))
    }

    /// Like `classify_response`, but never asks for another attempt: a
    /// retryable status is reported as a terminal `Temporary` error instead
    /// of driving a retry (see `post_attempt`).
    async fn classify_response_no_retry<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<Result<T, ProviderError>, String> {
        let status = response.status();

        if status.is_success() {
            return match response.json::<T>().await {
                Ok(body) => Ok(Ok(body)),
                Err(_) => Ok(Err(ProviderError::UnexpectedResponse)),
            };
        }

        let status_code = status.as_u16();
        if ProviderError::is_retryable_status(status_code) {
            return Ok(Err(ProviderError::Temporary {
                status: Some(status_code),
            }));
        }

        let message = response.text().await.unwrap_or_default();
        Ok(Err(ProviderError::Permanent {
            status: status_code,
            message,
        }))
    }

    fn unwrap_retry<T>(
        result: Result<Result<T, ProviderError>, RetryError<String>>,
    ) -> Result<T, ProviderError> {
        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(permanent)) => Err(permanent),
            Err(RetryError::MaxRetriesExceeded(_)) | Err(RetryError::OperationFailed(_)) => {
                Err(ProviderError::Temporary { status: None })
            }
        }
    }
}

impl From<ProviderPlacePayload> for crate::models::Place {
    fn from(p: ProviderPlacePayload) -> Self {
        crate::models::Place {
            id: p.id,
            name: p.name,
            city: p.city,
            address: p.address,
            seats_pattern: p.seats_pattern,
            created_at: p.created_at,
            changed_at: p.changed_at,
        }
    }
}
