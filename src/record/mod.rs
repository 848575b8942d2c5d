//! Records and id extraction
//!
//! A record is an ordered map of field name to tagged value. No schema is
//! enforced beyond the entity configuration: only configured fields must be
//! gettable. Records handed to the engine are owned copies; external
//! mutation of a source record is never observable through the engine.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A single record: field name → value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field in place
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns a field value, if present
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// True if the field is present
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// How an entity extracts a record's id.
#[derive(Clone)]
pub enum IdKey {
    /// Read a named field
    Field(String),
    /// Derive the id as a pure function of the record
    Computed(Arc<dyn Fn(&Record) -> Value + Send + Sync>),
}

impl IdKey {
    /// Id key reading the named field
    pub fn field(name: impl Into<String>) -> Self {
        IdKey::Field(name.into())
    }

    /// Id key computed from the record
    pub fn computed(f: impl Fn(&Record) -> Value + Send + Sync + 'static) -> Self {
        IdKey::Computed(Arc::new(f))
    }

    /// Extracts the id, or None when the backing field is absent.
    pub fn extract(&self, record: &Record) -> Option<Value> {
        match self {
            IdKey::Field(name) => record.get(name).cloned(),
            IdKey::Computed(f) => Some(f(record)),
        }
    }

    /// The backing field name, for field-based keys
    pub fn field_name(&self) -> Option<&str> {
        match self {
            IdKey::Field(name) => Some(name),
            IdKey::Computed(_) => None,
        }
    }
}

impl fmt::Debug for IdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKey::Field(name) => f.debug_tuple("Field").field(name).finish(),
            IdKey::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Builds a [`Record`] from `field => value` pairs.
#[macro_export]
macro_rules! record {
    ($($field:expr => $value:expr),* $(,)?) => {{
        let mut rec = $crate::record::Record::new();
        $(rec.set($field, $value);)*
        rec
    }};
}
