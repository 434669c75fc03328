/// Row and wire-format structs for the ticketing aggregator.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A venue, owned exclusively by the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: String,
    pub seats_pattern: String,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
}

/// Event lifecycle status as mirrored from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EventStatus::Draft),
            "published" => Ok(EventStatus::Published),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(crate::error::AppError::Internal(format!(
                "unknown event status: {other}"
            ))),
        }
    }
}

/// An event, owned exclusively by the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub event_time: DateTime<Utc>,
    pub place_id: Uuid,
    pub registration_deadline: DateTime<Utc>,
    pub status: String,
    pub number_of_visitors: i32,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
    pub status_changed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub name: String,
    pub event_time: DateTime<Utc>,
    pub place_id: Uuid,
    pub registration_deadline: DateTime<Utc>,
    pub status: String,
    pub number_of_visitors: i32,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
    pub status_changed_at: Option<DateTime<Utc>>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            name: row.name,
            event_time: row.event_time,
            place_id: row.place_id,
            registration_deadline: row.registration_deadline,
            status: row.status,
            number_of_visitors: row.number_of_visitors,
            created_at: row.created_at,
            changed_at: row.changed_at,
            status_changed_at: row.status_changed_at,
        }
    }
}

/// A ticket, owned exclusively by the ticket pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: i64,
    pub ticket_id: Uuid,
    pub event_id: Uuid,
    pub seat: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

/// Singleton watermark row guarding overlapping sync runs.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SyncMetadata {
    pub id: i32,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_changed_at: Option<DateTime<Utc>>,
    pub sync_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Keyed response memoization row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IdempotencyRecord {
    pub key: String,
    pub response_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Provider wire payload for a single event (as returned by `/events/`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEventPayload {
    pub id: Uuid,
    pub name: String,
    pub place: ProviderPlacePayload,
    pub event_time: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub status: String,
    pub number_of_visitors: i32,
    pub changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status_changed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPlacePayload {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: String,
    pub seats_pattern: String,
    pub changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEventsPage {
    pub next: Option<String>,
    #[allow(dead_code)]
    pub previous: Option<String>,
    pub results: Vec<ProviderEventPayload>,
}

// ---- HTTP DTOs ----

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub date_from: Option<NaiveDate>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct SeatsResponse {
    pub event_id: Uuid,
    pub available_seats: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    pub event_id: Uuid,
    #[validate(length(min = 3, max = 100))]
    pub first_name: String,
    #[validate(length(min = 3, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 10))]
    pub seat: String,
    #[validate(length(min = 1, max = 255))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTicketResponse {
    pub ticket_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CancelTicketResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncTriggerResponse {
    pub status: String,
}

/// `GET /api/health` response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The input fingerprint recorded alongside an idempotency key, so later
/// replays on the same key can detect conflicting payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketFingerprint {
    pub event_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub seat: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTicketResponse {
    #[serde(flatten)]
    pub fingerprint: TicketFingerprint,
    pub ticket_id: Option<Uuid>,
}
