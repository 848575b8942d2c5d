//! Per-entity storage
//!
//! One `EntityState` holds the primary store and every derived structure for
//! one entity. Sorted lists and uniques live under their encoded string keys
//! so the warm, mutation, and read paths always address the same entries.

use std::collections::HashMap;

use crate::index::keys::{index_key, uniques_list_key, uniques_map_key};
use crate::index::{LookupMap, Prefilter, UniquesBundle};
use crate::record::Record;
use crate::schema::EntityConfig;
use crate::value::{SortDirection, Value};
use crate::view::ViewSpec;

/// All stored state for one entity.
#[derive(Debug)]
pub struct EntityState {
    config: EntityConfig,
    primary: HashMap<Value, Record>,
    indexes: HashMap<String, Vec<Value>>,
    uniques_counts: HashMap<String, HashMap<Value, usize>>,
    uniques_lists: HashMap<String, Vec<Value>>,
    lookups: HashMap<String, LookupMap>,
    views: HashMap<String, ViewSpec>,
}

impl EntityState {
    /// Creates empty state for a configuration
    pub fn new(config: EntityConfig) -> Self {
        Self {
            config,
            primary: HashMap::new(),
            indexes: HashMap::new(),
            uniques_counts: HashMap::new(),
            uniques_lists: HashMap::new(),
            lookups: HashMap::new(),
            views: HashMap::new(),
        }
    }

    /// The entity configuration
    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    /// The entity name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    // ------------------------------------------------------------------
    // Primary store
    // ------------------------------------------------------------------

    /// A stored record by id
    pub fn record(&self, id: &Value) -> Option<&Record> {
        self.primary.get(id)
    }

    /// Overwrites the primary entry
    pub fn insert_record(&mut self, id: Value, record: Record) {
        self.primary.insert(id, record);
    }

    /// Deletes the primary entry
    pub fn remove_record(&mut self, id: &Value) -> Option<Record> {
        self.primary.remove(id)
    }

    /// Number of stored records
    pub fn record_count(&self) -> usize {
        self.primary.len()
    }

    /// A stored record's field value, for insertion comparators
    pub fn stored_field(&self, id: &Value, field: &str) -> Option<Value> {
        self.primary.get(id).and_then(|r| r.get(field).cloned())
    }

    // ------------------------------------------------------------------
    // Sorted indexes
    // ------------------------------------------------------------------

    /// The id list for `(prefilter, field, dir)`, if materialized
    pub fn ids(&self, prefilter: &Prefilter, field: &str, dir: SortDirection) -> Option<&Vec<Value>> {
        self.indexes
            .get(&index_key(&self.config.name, prefilter, dir, field))
    }

    /// Owned copy of the descending list, empty when absent
    pub fn desc_list(&self, prefilter: &Prefilter, field: &str) -> Vec<Value> {
        self.ids(prefilter, field, SortDirection::Desc)
            .cloned()
            .unwrap_or_default()
    }

    /// Writes a descending list and its ascending reverse.
    ///
    /// Empty lists delete both backing entries.
    pub fn write_index_pair(&mut self, prefilter: &Prefilter, field: &str, desc: Vec<Value>) {
        let desc_key = index_key(&self.config.name, prefilter, SortDirection::Desc, field);
        let asc_key = index_key(&self.config.name, prefilter, SortDirection::Asc, field);

        if desc.is_empty() {
            self.indexes.remove(&desc_key);
            self.indexes.remove(&asc_key);
            return;
        }

        let asc: Vec<Value> = desc.iter().rev().cloned().collect();
        self.indexes.insert(desc_key, desc);
        self.indexes.insert(asc_key, asc);
    }

    /// Deletes both directions for `(prefilter, field)`
    pub fn delete_index_pair(&mut self, prefilter: &Prefilter, field: &str) {
        let name = &self.config.name;
        self.indexes
            .remove(&index_key(name, prefilter, SortDirection::Desc, field));
        self.indexes
            .remove(&index_key(name, prefilter, SortDirection::Asc, field));
    }

    // ------------------------------------------------------------------
    // Uniques
    // ------------------------------------------------------------------

    /// Rehydrates the stored bundle for `(prefilter, field)` with clean flags
    pub fn uniques_bundle(&self, prefilter: &Prefilter, field: &str) -> UniquesBundle {
        let name = &self.config.name;
        let counts = self
            .uniques_counts
            .get(&uniques_map_key(name, prefilter, field))
            .cloned()
            .unwrap_or_default();
        let list = self
            .uniques_lists
            .get(&uniques_list_key(name, prefilter, field))
            .cloned()
            .unwrap_or_default();
        UniquesBundle::from_parts(counts, list)
    }

    /// Persists a bundle.
    ///
    /// An empty bundle under a field prefilter deletes both entries; global
    /// and view scopes retain empty bundles until destroyed explicitly.
    pub fn persist_uniques(&mut self, prefilter: &Prefilter, field: &str, bundle: UniquesBundle) {
        let name = self.config.name.clone();
        let map_key = uniques_map_key(&name, prefilter, field);
        let list_key = uniques_list_key(&name, prefilter, field);

        if bundle.is_empty() && matches!(prefilter, Prefilter::Field { .. }) {
            self.uniques_counts.remove(&map_key);
            self.uniques_lists.remove(&list_key);
            return;
        }

        let write_list = bundle.list_changed() || !self.uniques_lists.contains_key(&list_key);
        let (counts, list) = bundle.into_parts();
        self.uniques_counts.insert(map_key, counts);
        if write_list {
            self.uniques_lists.insert(list_key, list);
        }
    }

    /// Deletes both uniques entries for `(prefilter, field)`
    pub fn delete_uniques(&mut self, prefilter: &Prefilter, field: &str) {
        let name = &self.config.name;
        self.uniques_counts
            .remove(&uniques_map_key(name, prefilter, field));
        self.uniques_lists
            .remove(&uniques_list_key(name, prefilter, field));
    }

    /// Stored counts for reads, empty when absent
    pub fn uniques_counts(&self, prefilter: &Prefilter, field: &str) -> HashMap<Value, usize> {
        self.uniques_counts
            .get(&uniques_map_key(&self.config.name, prefilter, field))
            .cloned()
            .unwrap_or_default()
    }

    /// Stored sorted list for reads, empty when absent
    pub fn uniques_list(&self, prefilter: &Prefilter, field: &str) -> Vec<Value> {
        self.uniques_lists
            .get(&uniques_list_key(&self.config.name, prefilter, field))
            .cloned()
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// The lookup map for a field, if any id is stored
    pub fn lookup(&self, field: &str) -> Option<&LookupMap> {
        self.lookups.get(field)
    }

    /// The lookup map for a field, created on demand
    pub fn lookup_mut(&mut self, field: &str) -> &mut LookupMap {
        self.lookups.entry(field.to_string()).or_default()
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// A registered view by fingerprint
    pub fn view(&self, fingerprint: &str) -> Option<&ViewSpec> {
        self.views.get(fingerprint)
    }

    /// All registered views
    pub fn views(&self) -> &HashMap<String, ViewSpec> {
        &self.views
    }

    /// Registered views, cloned for iteration during mutation
    pub fn views_cloned(&self) -> Vec<(String, ViewSpec)> {
        self.views
            .iter()
            .map(|(fp, view)| (fp.clone(), view.clone()))
            .collect()
    }

    /// Registers a view
    pub fn insert_view(&mut self, fingerprint: String, view: ViewSpec) {
        self.views.insert(fingerprint, view);
    }

    /// Unregisters a view
    pub fn remove_view(&mut self, fingerprint: &str) -> Option<ViewSpec> {
        self.views.remove(fingerprint)
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Whether a record falls under a prefilter scope.
    pub fn record_in(&self, record: &Record, prefilter: &Prefilter) -> bool {
        match prefilter {
            Prefilter::Global => true,
            Prefilter::Field { field, value } => record.get(field) == Some(value),
            Prefilter::View(fingerprint) => match self.views.get(fingerprint) {
                Some(view) => self.record_in(record, &view.prefilter) && view.admits(record),
                None => false,
            },
        }
    }

    /// Every key currently referencing the given fingerprint, for teardown
    /// verification in tests.
    pub fn keys_referencing(&self, fingerprint: &str) -> Vec<String> {
        self.indexes
            .keys()
            .chain(self.uniques_counts.keys())
            .chain(self.uniques_lists.keys())
            .filter(|key| key.contains(fingerprint))
            .cloned()
            .collect()
    }
}
