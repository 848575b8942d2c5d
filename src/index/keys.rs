//! Deterministic string keys for derived structures
//!
//! Every sub-index is stored under a composed string key. Keys are internal
//! but stable within a process lifetime, so warm, mutation, and read paths
//! always agree on where a structure lives.

use super::Prefilter;
use crate::value::SortDirection;

/// Tag fragment for a prefilter scope
fn prefilter_tag(prefilter: &Prefilter) -> String {
    match prefilter {
        Prefilter::Global => "[]".to_string(),
        Prefilter::Field { field, value } => format!("[{}={}]", field, value),
        Prefilter::View(fingerprint) => fingerprint.clone(),
    }
}

/// Key of a sorted id list
pub fn index_key(entity: &str, prefilter: &Prefilter, dir: SortDirection, field: &str) -> String {
    format!(
        "idx_{}{}{}_{}",
        entity,
        prefilter_tag(prefilter),
        dir.as_str(),
        field
    )
}

/// Key of a uniques count map
pub fn uniques_map_key(entity: &str, prefilter: &Prefilter, field: &str) -> String {
    format!("uniques_map_{}{}{}", entity, prefilter_tag(prefilter), field)
}

/// Key of a uniques sorted value list
pub fn uniques_list_key(entity: &str, prefilter: &Prefilter, field: &str) -> String {
    format!("uniques_list_{}{}{}", entity, prefilter_tag(prefilter), field)
}

/// Key of a reverse lookup map
pub fn lookup_key(entity: &str, field: &str) -> String {
    format!("lookup_{}{}", entity, field)
}
