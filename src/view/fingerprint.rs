//! View fingerprints
//!
//! A fingerprint is a 24-hex-character identifier derived deterministically
//! from a view's parameter map. It doubles as a map key and a pub/sub topic
//! name, so the truncated length is part of the contract.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::value::Value;

/// Characters of lowercase hex kept from the digest
const FINGERPRINT_LEN: usize = 24;

/// Derives the fingerprint for a parameter map.
///
/// Entries are joined as `{key}.{value}` in key order, `:`-separated, then
/// SHA-256 hashed, hex-encoded, and truncated.
pub fn fingerprint(params: &BTreeMap<String, Value>) -> String {
    let joined = params
        .iter()
        .map(|(key, value)| format!("{}.{}", key, render(value)))
        .collect::<Vec<_>>()
        .join(":");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

/// Scalars render bare; anything without a bare form uses the debug form.
fn render(value: &Value) -> String {
    match value {
        Value::Null
        | Value::Bool(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Str(_) => value.to_string(),
        other => format!("{:?}", other),
    }
}
