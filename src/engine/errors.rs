//! Engine error types

use thiserror::Error;

use crate::paginate::CursorError;
use crate::schema::ConfigError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Runtime engine errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The entity was never warmed
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// The record id is absent
    #[error("record not found: {0}")]
    NotFound(String),

    /// A view with this fingerprint is already registered
    #[error("view already exists: {0}")]
    DuplicateView(String),

    /// No view with this fingerprint is registered
    #[error("view not found: {0}")]
    ViewNotFound(String),

    /// A record lacks a field the entity configuration requires
    #[error("record lacks configured field '{0}'")]
    MissingField(String),

    /// Warm-time configuration rejection
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Pagination cursor failure
    #[error(transparent)]
    Cursor(#[from] CursorError),
}
