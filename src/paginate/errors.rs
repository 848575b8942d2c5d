//! Pagination error types

use thiserror::Error;

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Cursor failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CursorError {
    /// The cursor string failed to decode
    #[error("cursor failed to decode")]
    BadCursor,

    /// Both paging directions were supplied
    #[error("'after' and 'before' are mutually exclusive")]
    ConflictingCursors,
}
