//! Configuration error types

use thiserror::Error;

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Warm-time configuration rejections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An entity must declare at least one sortable field
    #[error("entity '{0}' declares no fields")]
    EmptyFields(String),

    /// The warm hint names a field that is not configured
    #[error("entity '{entity}': hint field '{field}' is not a configured field")]
    UnknownHintField { entity: String, field: String },

    /// A bare global prefilter entry is illegal; the global scope is implicit
    #[error("entity '{0}': explicit global prefilter without options")]
    IllegalGlobalPrefilter(String),

    /// A prefilter partitions on a field that is not configured
    #[error("entity '{entity}': prefilter field '{field}' is not a configured field")]
    UnknownPrefilterField { entity: String, field: String },

    /// The same field appears twice in the prefilter list
    #[error("entity '{entity}': duplicate prefilter on field '{field}'")]
    DuplicatePrefilter { entity: String, field: String },

    /// The same entity name was warmed twice
    #[error("duplicate entity '{0}'")]
    DuplicateEntity(String),
}
