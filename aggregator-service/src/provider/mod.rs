/// Typed RPC client for the upstream events provider.
pub mod client;
pub mod paginator;

pub use client::ProviderClient;
pub use paginator::EventsPaginator;

/// Classification of a failed provider call, produced by [`ProviderClient`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Retries exhausted on a transport error or a retryable HTTP status.
    #[error("provider temporary error (status {status:?})")]
    Temporary { status: Option<u16> },

    /// Non-retryable HTTP error, surfaced immediately.
    #[error("provider permanent error {status}: {message}")]
    Permanent { status: u16, message: String },

    /// A 2xx body was missing required fields.
    #[error("provider returned an unexpected response")]
    UnexpectedResponse,
}

impl ProviderError {
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 408 | 429 | 500 | 502 | 503 | 504) || status >= 500
    }
}
