//! Prometheus metrics for the ticketing aggregator.
//!
//! Component-specific collectors live in `transactional-outbox::metrics`
//! (outbox) and are registered against the shared default registry; this
//! module only exposes the scrape endpoint.

use actix_web::HttpResponse;
use prometheus::{Encoder, TextEncoder};

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
