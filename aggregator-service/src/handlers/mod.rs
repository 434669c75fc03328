/// HTTP request handlers and shared application state.
pub mod events;
pub mod health;
pub mod sync;
pub mod tickets;

use crate::config::Config;
use crate::provider::ProviderClient;
use crate::seats::SeatsCache;
use sqlx::PgPool;
use std::sync::Arc;
use transactional_outbox::SqlxOutboxRepository;

pub use events::{get_event, get_event_seats, list_events};
pub use health::{health_live, health_ready, health_summary};
pub use sync::trigger_sync;
pub use tickets::{cancel_ticket_handler, create_ticket_handler};

/// Shared state injected into every handler, following the teacher's
/// `web::Data<FeedHandlerState>` pattern.
pub struct AppState {
    pub pool: PgPool,
    pub provider: Arc<ProviderClient>,
    pub seats_cache: Arc<SeatsCache>,
    pub outbox_repo: Arc<SqlxOutboxRepository>,
    pub config: Config,
}
