/// Database access layer: one repository per entity.
pub mod event_repo;
pub mod idempotency_repo;
pub mod place_repo;
pub mod sync_repo;
pub mod ticket_repo;

pub use event_repo::EventRepository;
pub use idempotency_repo::IdempotencyRepository;
pub use place_repo::PlaceRepository;
pub use sync_repo::SyncMetadataRepository;
pub use ticket_repo::TicketRepository;
