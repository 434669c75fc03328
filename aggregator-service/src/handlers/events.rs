use crate::db::EventRepository;
use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::{EventListResponse, ListEventsQuery, SeatsResponse};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// `GET /api/events/` — paginated catalogue, ordered by `event_time`
/// ascending.
pub async fn list_events(
    state: web::Data<AppState>,
    query: web::Query<ListEventsQuery>,
) -> Result<HttpResponse, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) as i64 * page_size as i64;

    let (count, results) =
        EventRepository::list(&state.pool, query.date_from, page_size as i64, offset).await?;

    let has_next = offset + page_size as i64 < count;
    let has_previous = page > 1;

    let base = "/api/events/";
    let query_suffix = |p: u32| -> String {
        match query.date_from {
            Some(date_from) => format!("{base}?date_from={date_from}&page={p}&page_size={page_size}"),
            None => format!("{base}?page={p}&page_size={page_size}"),
        }
    };

    let next = has_next.then(|| query_suffix(page + 1));
    let previous = has_previous.then(|| query_suffix(page - 1));

    Ok(HttpResponse::Ok().json(EventListResponse {
        count,
        next,
        previous,
        results,
    }))
}

/// `GET /api/events/{id}` — event detail.
pub async fn get_event(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let event = EventRepository::get_by_id(&state.pool, path.into_inner())
        .await?
        .ok_or(AppError::EventNotFound)?;

    Ok(HttpResponse::Ok().json(event))
}

/// `GET /api/events/{id}/seats` — available seats, served from the process
/// TTL cache.
pub async fn get_event_seats(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let event_id = path.into_inner();

    let event = EventRepository::get_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::EventNotFound)?;

    if event.status != "published" {
        return Err(AppError::EventNotPublished);
    }

    let available_seats = state
        .seats_cache
        .get_available_seats(&state.provider, event_id)
        .await?;

    Ok(HttpResponse::Ok().json(SeatsResponse {
        event_id,
        available_seats,
    }))
}
