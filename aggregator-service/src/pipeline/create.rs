use crate::config::IdempotencyConfig;
use crate::db::{EventRepository, IdempotencyRepository, TicketRepository};
use crate::error::AppError;
use crate::models::{CreateTicketRequest, StoredTicketResponse, TicketFingerprint};
use crate::provider::{ProviderClient, ProviderError};
use crate::seats::SeatsCache;
use crate::sync::{engine::SyncOutcome, SyncEngine};
use chrono::Utc;
use sqlx::PgPool;
use transactional_outbox::{OutboxRepository, SqlxOutboxRepository};
use uuid::Uuid;

/// Register a ticket. See module docs for the full seven-step contract.
pub async fn create_ticket(
    pool: &PgPool,
    provider: &ProviderClient,
    seats_cache: &SeatsCache,
    outbox_repo: &SqlxOutboxRepository,
    idempotency_cfg: &IdempotencyConfig,
    req: CreateTicketRequest,
) -> Result<Uuid, AppError> {
    let fingerprint = TicketFingerprint {
        event_id: req.event_id,
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        email: req.email.clone(),
        seat: req.seat.clone(),
    };

    if let Some(key) = &req.idempotency_key {
        if let Some(existing) = IdempotencyRepository::get(pool, key).await? {
            let stored: StoredTicketResponse = serde_json::from_value(existing.response_data)?;
            if stored.fingerprint != fingerprint {
                return Err(AppError::IdempotencyConflict);
            }
            return stored.ticket_id.ok_or(AppError::IdempotencyCorrupt);
        }
    }

    let engine = SyncEngine::new(pool, provider);
    match engine.run(None).await {
        Ok(SyncOutcome::Completed { .. }) | Ok(SyncOutcome::Skipped) => {}
        Err(
            AppError::ProviderNetworkError
            | AppError::ProviderPermanentError { .. }
            | AppError::ProviderUnexpectedResponse,
        ) => return Err(AppError::FailedSyncEvent),
        Err(other) => return Err(other),
    }

    let event = EventRepository::get_by_id(pool, req.event_id)
        .await?
        .ok_or(AppError::EventNotFound)?;

    if event.status != "published" {
        return Err(AppError::EventNotPublished);
    }
    if event.registration_deadline < Utc::now() {
        return Err(AppError::EventPassed);
    }

    let available_seats = seats_cache
        .get_available_seats(provider, req.event_id)
        .await?;
    if !available_seats.contains(&req.seat) {
        return Err(AppError::SeatUnavailable("seat is not in the provider's free list".to_string()));
    }

    let ticket_id = match provider
        .register(req.event_id, &req.first_name, &req.last_name, &req.email, &req.seat)
        .await
    {
        Ok(ticket_id) => ticket_id,
        Err(ProviderError::Permanent { .. }) => {
            return Err(AppError::SeatUnavailable("возможно, место уже занято".to_string()))
        }
        Err(ProviderError::Temporary { .. }) => return Err(AppError::ProviderNetworkError),
        Err(ProviderError::UnexpectedResponse) => return Err(AppError::ProviderUnexpectedResponse),
    };

    let outbox_payload = serde_json::json!({
        "event_id": fingerprint.event_id,
        "first_name": fingerprint.first_name,
        "last_name": fingerprint.last_name,
        "email": fingerprint.email,
        "seat": fingerprint.seat,
        "ticket_id": ticket_id,
    });

    let mut tx = pool.begin().await?;

    TicketRepository::create(
        &mut tx,
        ticket_id,
        req.event_id,
        &req.seat,
        &req.first_name,
        &req.last_name,
        &req.email,
    )
    .await?;

    outbox_repo
        .create(&mut tx, "ticket_created", outbox_payload)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if let Some(key) = &req.idempotency_key {
        let stored = StoredTicketResponse {
            fingerprint: fingerprint.clone(),
            ticket_id: Some(ticket_id),
        };
        let response_data = serde_json::to_value(&stored)?;
        IdempotencyRepository::save(&mut tx, key, &response_data, idempotency_cfg.ttl_days).await?;
    }

    tx.commit().await?;

    Ok(ticket_id)
}
