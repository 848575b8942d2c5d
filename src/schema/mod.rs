//! Entity configuration
//!
//! Configuration is created once at warm time and never mutated afterwards.
//!
//! # Invariants
//!
//! - The first configured field is the default order for listing and paging
//! - The global prefilter is always present, implicitly
//! - Validation happens before any structure is built; no partial warms

mod errors;
mod types;
mod validator;

pub use errors::{ConfigError, ConfigResult};
pub use types::{EntityConfig, FieldConfig, PrefilterConfig, SortHint, WarmBatch};
pub use validator::validate_entity;
