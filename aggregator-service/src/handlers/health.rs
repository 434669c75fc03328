use crate::handlers::AppState;
use crate::models::HealthResponse;
use actix_web::{web, HttpResponse};

/// `GET /api/health` — upstream reachability probe.
pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    let body = match state.provider.check_availability().await {
        Ok(resp) => HealthResponse {
            status: resp.status,
            detail: None,
        },
        Err(e) => HealthResponse {
            status: "fault".to_string(),
            detail: Some(e.to_string()),
        },
    };

    HttpResponse::Ok().json(body)
}

/// `GET /api/health/ready` — ambient readiness probe (database reachable).
pub async fn health_ready(state: web::Data<AppState>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "ready": true })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "ready": false,
            "error": e.to_string(),
        })),
    }
}

/// `GET /api/health/live` — ambient liveness probe.
pub async fn health_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}
