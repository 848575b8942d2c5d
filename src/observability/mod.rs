//! Observability
//!
//! Structured logging for engine lifecycle events.
//!
//! - Structured logs (JSON), one line = one event
//! - Context fields are engine values and keep their JSON type
//! - Deterministic key ordering
//! - Synchronous, no buffering; error and fatal lines route to stderr

mod logger;

pub use logger::{Logger, Severity};
