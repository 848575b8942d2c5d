//! Opaque pagination cursors
//!
//! A cursor is a map of cursor field to the record's value for that field,
//! serialized to JSON and base64-encoded (URL-safe, unpadded). Callers treat
//! the string as opaque; any decode failure is `BadCursor`.

use std::collections::BTreeMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use super::errors::{CursorError, CursorResult};
use crate::value::Value;

/// A decoded cursor: cursor field → value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    fields: BTreeMap<String, Value>,
}

impl Cursor {
    /// Builds a cursor from field/value pairs
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    /// The value stored for a cursor field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Encodes to the opaque wire string
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(&self.fields).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes an opaque wire string
    pub fn decode(encoded: &str) -> CursorResult<Cursor> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| CursorError::BadCursor)?;
        let fields: BTreeMap<String, Value> =
            serde_json::from_slice(&bytes).map_err(|_| CursorError::BadCursor)?;
        Ok(Cursor { fields })
    }
}
