/// Event-Ticketing Aggregator
///
/// Mirrors a catalogue of events and venues from an upstream provider into a
/// local relational store, serves paginated catalogue queries, and brokers
/// ticket registration/cancellation with exactly-once client semantics and
/// at-least-once downstream notification.
///
/// # Modules
///
/// - `provider`: retry-aware HTTP client for the upstream events provider
/// - `seats`: process-local TTL cache of available seats per event
/// - `sync`: incremental sync engine and its scheduler
/// - `db`: repositories over places, events, tickets, sync metadata, idempotency
/// - `outbox`: thin wrapper wiring `transactional-outbox` to this domain
/// - `notifier`: downstream notification HTTP client
/// - `pipeline`: ticket registration/cancellation orchestration
/// - `handlers`: HTTP request handlers
/// - `models`: row and DTO structs
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: observability
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod notifier;
pub mod outbox;
pub mod pipeline;
pub mod provider;
pub mod seats;
pub mod sync;

pub use config::Config;
pub use error::{AppError, Result};
