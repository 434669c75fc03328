/// Incremental sync engine and its background scheduler.
pub mod engine;
pub mod scheduler;

pub use engine::SyncEngine;
pub use scheduler::SyncScheduler;
