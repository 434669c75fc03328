use crate::handlers::AppState;
use crate::models::SyncTriggerResponse;
use crate::sync::{engine::SyncOutcome, SyncEngine};
use actix_web::{web, HttpResponse};
use tracing::error;

/// `POST /api/sync/trigger` — on-demand sync. Always responds 200; lock
/// contention is reported as `"in progress"`, not an error.
pub async fn trigger_sync(state: web::Data<AppState>) -> HttpResponse {
    let engine = SyncEngine::new(&state.pool, &state.provider);

    let status = match engine.run(None).await {
        Ok(SyncOutcome::Completed { .. }) => "success",
        Ok(SyncOutcome::Skipped) => "in progress",
        Err(e) => {
            error!(error = ?e, "on-demand sync failed");
            "failed"
        }
    };

    HttpResponse::Ok().json(SyncTriggerResponse {
        status: status.to_string(),
    })
}
