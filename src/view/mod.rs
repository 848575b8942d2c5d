//! Registered views
//!
//! A view is a named filtered result set: a base prefilter narrowed by an
//! arbitrary record predicate, identified by a stable fingerprint of the
//! parameters that produced it. Views own derived sorted indexes and uniques
//! bundles scoped by their fingerprint; they never own records.

mod fingerprint;

pub use fingerprint::fingerprint;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::index::Prefilter;
use crate::record::Record;
use crate::value::Value;

/// Record-level filter behind a view.
pub trait RecordPredicate: Send + Sync {
    /// Whether the record belongs to the view
    fn matches(&self, record: &Record) -> bool;
}

impl<F> RecordPredicate for F
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    fn matches(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Specification of one view.
#[derive(Clone)]
pub struct ViewSpec {
    /// Base scope the predicate narrows
    pub prefilter: Prefilter,
    /// Record predicate; None admits every record under the prefilter
    pub predicate: Option<Arc<dyn RecordPredicate>>,
    /// Fields with fingerprint-scoped uniques bundles
    pub maintain_unique: Vec<String>,
    /// Opaque parameters the fingerprint was derived from
    pub params: BTreeMap<String, Value>,
}

impl ViewSpec {
    /// A view over the global scope with no predicate.
    pub fn new() -> Self {
        Self {
            prefilter: Prefilter::Global,
            predicate: None,
            maintain_unique: Vec::new(),
            params: BTreeMap::new(),
        }
    }

    /// Sets the base prefilter
    pub fn with_prefilter(mut self, prefilter: Prefilter) -> Self {
        self.prefilter = prefilter;
        self
    }

    /// Sets the record predicate
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&Record) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets fingerprint-scoped uniques fields
    pub fn with_maintain_unique(mut self, fields: &[&str]) -> Self {
        self.maintain_unique = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Sets the derivation parameters
    pub fn with_params(mut self, params: BTreeMap<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Whether the predicate admits the record; prefilter scope not applied.
    pub fn admits(&self, record: &Record) -> bool {
        self.predicate
            .as_ref()
            .map_or(true, |predicate| predicate.matches(record))
    }
}

impl Default for ViewSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ViewSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSpec")
            .field("prefilter", &self.prefilter)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .field("maintain_unique", &self.maintain_unique)
            .field("params", &self.params)
            .finish()
    }
}
