use crate::db::{EventRepository, TicketRepository};
use crate::error::AppError;
use crate::provider::{ProviderClient, ProviderError};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Cancel a ticket. Does not write to the outbox — cancellation has no
/// downstream notification in this system.
pub async fn cancel_ticket(pool: &PgPool, provider: &ProviderClient, ticket_id: Uuid) -> Result<(), AppError> {
    let ticket = TicketRepository::get_by_ticket_id(pool, ticket_id)
        .await?
        .ok_or(AppError::TicketNotFound)?;

    let event = EventRepository::get_by_id(pool, ticket.event_id)
        .await?
        .ok_or(AppError::EventNotFound)?;

    if event.registration_deadline < Utc::now() {
        return Err(AppError::EventPassed);
    }

    let success = match provider.unregister(ticket.event_id, ticket_id).await {
        Ok(success) => success,
        Err(ProviderError::Permanent { .. }) => {
            return Err(AppError::SeatUnavailable("возможно, место уже занято".to_string()))
        }
        Err(ProviderError::Temporary { .. }) => return Err(AppError::ProviderNetworkError),
        Err(ProviderError::UnexpectedResponse) => return Err(AppError::ProviderUnexpectedResponse),
    };
    if !success {
        return Err(AppError::ProviderUnexpectedResponse);
    }

    let mut tx = pool.begin().await?;
    TicketRepository::delete(&mut tx, ticket_id).await?;
    tx.commit().await?;

    Ok(())
}
