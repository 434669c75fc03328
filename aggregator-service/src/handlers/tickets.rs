use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::{CancelTicketResponse, CreateTicketRequest, CreateTicketResponse};
use crate::pipeline;
use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

/// `POST /api/tickets` — register.
pub async fn create_ticket_handler(
    state: web::Data<AppState>,
    body: web::Json<CreateTicketRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let ticket_id = pipeline::create_ticket(
        &state.pool,
        &state.provider,
        &state.seats_cache,
        &state.outbox_repo,
        &state.config.idempotency,
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(CreateTicketResponse { ticket_id }))
}

/// `DELETE /api/tickets/{id}` — cancel.
pub async fn cancel_ticket_handler(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    pipeline::cancel_ticket(&state.pool, &state.provider, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(CancelTicketResponse { success: true }))
}
