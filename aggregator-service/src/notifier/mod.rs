/// Downstream notification HTTP client, called by the outbox worker.
pub mod capashino_client;

pub use capashino_client::{CapashinoClient, NotifierError};
