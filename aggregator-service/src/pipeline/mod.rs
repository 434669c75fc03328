/// Orchestrated ticket registration/cancellation use cases.
pub mod cancel;
pub mod create;

pub use cancel::cancel_ticket;
pub use create::create_ticket;
