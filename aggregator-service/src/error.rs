/// Error types for the ticketing aggregator.
///
/// A single sum type carries every domain failure kind; HTTP status codes
/// live only in the `ResponseError` impl below, never inside the variants
/// themselves.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    EventNotFound,
    EventNotPublished,
    EventPassed,
    SeatUnavailable(String),
    TicketNotFound,
    ProviderNetworkError,
    ProviderPermanentError { status: u16, message: String },
    ProviderUnexpectedResponse,
    IdempotencyConflict,
    IdempotencyCorrupt,
    FailedSyncEvent,
    Internal(String),
    /// Request body failed DTO validation.
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventNotFound => write!(f, "event not found"),
            AppError::EventNotPublished => write!(f, "event is not published"),
            AppError::EventPassed => write!(f, "registration deadline has passed"),
            AppError::SeatUnavailable(msg) => write!(f, "seat unavailable: {}", msg),
            AppError::TicketNotFound => write!(f, "ticket not found"),
            AppError::ProviderNetworkError => write!(f, "provider network error"),
            AppError::ProviderPermanentError { status, message } => {
                write!(f, "provider rejected request ({}): {}", status, message)
            }
            AppError::ProviderUnexpectedResponse => write!(f, "provider returned an unexpected response"),
            AppError::IdempotencyConflict => write!(f, "idempotency key reused with a different payload"),
            AppError::IdempotencyCorrupt => write!(f, "idempotency record is missing its ticket id"),
            AppError::FailedSyncEvent => write!(f, "on-demand sync failed"),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "validation error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::EventNotFound | AppError::TicketNotFound => StatusCode::NOT_FOUND,
            AppError::EventNotPublished | AppError::SeatUnavailable(_) => StatusCode::BAD_REQUEST,
            AppError::EventPassed => StatusCode::CONFLICT,
            AppError::ProviderNetworkError => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ProviderPermanentError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::ProviderUnexpectedResponse => StatusCode::BAD_GATEWAY,
            AppError::IdempotencyConflict | AppError::IdempotencyCorrupt => StatusCode::CONFLICT,
            AppError::FailedSyncEvent => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::provider::ProviderError> for AppError {
    fn from(err: crate::provider::ProviderError) -> Self {
        match err {
            crate::provider::ProviderError::Temporary { .. } => AppError::ProviderNetworkError,
            crate::provider::ProviderError::Permanent { status, message } => {
                AppError::ProviderPermanentError { status, message }
            }
            crate::provider::ProviderError::UnexpectedResponse => AppError::ProviderUnexpectedResponse,
        }
    }
}
