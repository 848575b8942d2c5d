//! Derived index structures
//!
//! Indexes are derived, in-memory-only state built at warm time and kept
//! consistent by the engine on every mutation.
//!
//! # Design Principles
//!
//! - Derived state: indexes mirror the primary store, never the source of truth
//! - Deterministic: stable sorts, stable key strings, stable tie order
//! - The ascending list is always the exact reverse of the descending list

pub mod keys;
mod lookup;
mod sorted;
mod uniques;

pub use lookup::LookupMap;
pub use sorted::{insert_desc, remove_id, sort_ids_asc};
pub use uniques::UniquesBundle;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Scope selector for a set of derived structures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prefilter {
    /// All records of the entity
    Global,
    /// Records whose `field` equals `value`
    Field { field: String, value: Value },
    /// Records selected by a registered view
    View(String),
}

impl Prefilter {
    /// Field-equality prefilter
    pub fn on(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Prefilter::Field {
            field: field.into(),
            value: value.into(),
        }
    }

    /// View prefilter for the given fingerprint
    pub fn view(fingerprint: impl Into<String>) -> Self {
        Prefilter::View(fingerprint.into())
    }
}
