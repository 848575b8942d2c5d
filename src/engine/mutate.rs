//! Record mutation
//!
//! `put` and `drop_record` apply one record's change to every dependent
//! structure: the primary store, every sorted pair whose prefilter the
//! record touches, every uniques bundle, every registered view, and every
//! lookup. A drop is a put whose new state is absent.
//!
//! Per record and prefilter the transition is one of: insert, no-op,
//! re-sort (remove then insert), exit old scope / enter new scope, remove.

use std::sync::Arc;

use super::errors::{EngineError, EngineResult};
use super::state::EntityState;
use super::warm::extract_id;
use super::Engine;
use crate::index::{insert_desc, remove_id, Prefilter};
use crate::observability::Logger;
use crate::pubsub::{Broadcaster, UniquesEvent, ViewMessage};
use crate::record::Record;
use crate::schema::{EntityConfig, PrefilterConfig};
use crate::value::Value;

impl Engine {
    /// Inserts or updates a record.
    ///
    /// A record byte-equal to the stored one is a no-op. The primary entry
    /// is overwritten first, then every derived structure is updated.
    pub fn put(&mut self, entity: &str, record: Record) -> EngineResult<()> {
        let broadcaster = self.broadcaster();
        let state = self.state_mut(entity)?;
        let config = state.config().clone();

        let id = extract_id(&config, &record)?;
        for field in config.required_fields() {
            if !record.contains(field) {
                return Err(EngineError::MissingField(field.to_string()));
            }
        }

        let prev = state.record(&id).cloned();
        if prev.as_ref() == Some(&record) {
            return Ok(());
        }

        state.insert_record(id.clone(), record.clone());
        apply_prefilters(state, &config, prev.as_ref(), Some(&record), &id);
        apply_views(state, broadcaster.as_ref(), &config, prev.as_ref(), Some(&record), &id);
        apply_lookups(state, &config, prev.as_ref(), Some(&record), &id);

        Ok(())
    }

    /// Deletes a record by id.
    ///
    /// Every derived structure sheds the id before the primary entry is
    /// deleted. Fails with `NotFound` when the id is absent, with no state
    /// change.
    pub fn drop_record(&mut self, entity: &str, id: &Value) -> EngineResult<()> {
        let broadcaster = self.broadcaster();
        let state = self.state_mut(entity)?;
        let config = state.config().clone();

        let prev = state
            .record(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        apply_prefilters(state, &config, Some(&prev), None, id);
        apply_views(state, broadcaster.as_ref(), &config, Some(&prev), None, id);
        apply_lookups(state, &config, Some(&prev), None, id);
        state.remove_record(id);

        Logger::trace(
            "RECORD_DROPPED",
            &[("entity", Value::from(entity)), ("id", id.clone())],
        );
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Prefilter scopes
// ----------------------------------------------------------------------

fn apply_prefilters(
    state: &mut EntityState,
    config: &EntityConfig,
    prev: Option<&Record>,
    new: Option<&Record>,
    id: &Value,
) {
    apply_global_scope(state, config, prev, new, id);
    for prefilter in config.effective_prefilters() {
        if let Some(pf_key) = &prefilter.field {
            apply_partitioned_scope(state, config, &prefilter, pf_key, prev, new, id);
        }
    }
}

fn apply_global_scope(
    state: &mut EntityState,
    config: &EntityConfig,
    prev: Option<&Record>,
    new: Option<&Record>,
    id: &Value,
) {
    for field in &config.fields {
        update_index_for_field(state, config, prev, new, id, &Prefilter::Global, &field.name);
    }
    for unique in config.global_maintain_unique() {
        update_uniques_for_field(state, prev, new, &Prefilter::Global, &unique);
    }
}

/// One partitioned scope: every known partition value is visited, and a
/// value never seen before gets a fresh partition with an empty baseline.
fn apply_partitioned_scope(
    state: &mut EntityState,
    config: &EntityConfig,
    prefilter: &PrefilterConfig,
    pf_key: &str,
    prev: Option<&Record>,
    new: Option<&Record>,
    id: &Value,
) {
    let known: Vec<Value> = state
        .uniques_bundle(&Prefilter::Global, pf_key)
        .list()
        .to_vec();
    let new_value = new.and_then(|n| n.get(pf_key).cloned());

    for value in &known {
        let scope = Prefilter::Field {
            field: pf_key.to_string(),
            value: value.clone(),
        };

        let last_removed = update_global_prefilter_bundle(state, prev, new, pf_key, value);
        for field in &config.fields {
            update_index_for_field(state, config, prev, new, id, &scope, &field.name);
        }
        for unique in &prefilter.maintain_unique {
            update_uniques_for_field(state, prev, new, &scope, unique);
        }

        if last_removed {
            prune_partition(state, config, prefilter, pf_key, value);
        }
    }

    if let Some(value) = new_value {
        if !known.contains(&value) {
            let mut discovery = state.uniques_bundle(&Prefilter::Global, pf_key);
            discovery.add(value.clone());
            state.persist_uniques(&Prefilter::Global, pf_key, discovery);

            let scope = Prefilter::Field {
                field: pf_key.to_string(),
                value,
            };
            for field in &config.fields {
                update_index_for_field(state, config, prev, new, id, &scope, &field.name);
            }
            for unique in &prefilter.maintain_unique {
                update_uniques_for_field(state, prev, new, &scope, unique);
            }
        }
    }
}

/// Moves the partition value of one record through the global discovery
/// bundle. Returns whether the last instance of `value` disappeared.
fn update_global_prefilter_bundle(
    state: &mut EntityState,
    prev: Option<&Record>,
    new: Option<&Record>,
    pf_key: &str,
    value: &Value,
) -> bool {
    let prev_value = prev.and_then(|p| p.get(pf_key));
    let new_value = new.and_then(|n| n.get(pf_key));

    if prev.is_some() && new.is_some() && prev_value == new_value {
        return false;
    }

    let mut bundle = state.uniques_bundle(&Prefilter::Global, pf_key);
    if prev.is_some() && prev_value == Some(value) {
        bundle.remove(value);
    }
    if new.is_some() && new_value == Some(value) {
        bundle.add(value.clone());
    }
    let last_removed = bundle.last_removed();
    state.persist_uniques(&Prefilter::Global, pf_key, bundle);
    last_removed
}

/// Deletes every derived structure scoped to a now-empty partition value.
fn prune_partition(
    state: &mut EntityState,
    config: &EntityConfig,
    prefilter: &PrefilterConfig,
    pf_key: &str,
    value: &Value,
) {
    let scope = Prefilter::Field {
        field: pf_key.to_string(),
        value: value.clone(),
    };
    for field in &config.fields {
        state.delete_index_pair(&scope, &field.name);
    }
    for unique in &prefilter.maintain_unique {
        state.delete_uniques(&scope, unique);
    }

    Logger::trace(
        "PARTITION_PRUNED",
        &[
            ("entity", Value::from(state.name())),
            ("field", Value::from(pf_key)),
            ("value", value.clone()),
        ],
    );
}

// ----------------------------------------------------------------------
// Sorted pair maintenance
// ----------------------------------------------------------------------

/// Applies one record transition to the `(prefilter, field)` sorted pair.
///
/// The descending list is the one maintained; the ascending list is always
/// written as its exact reverse.
fn update_index_for_field(
    state: &mut EntityState,
    config: &EntityConfig,
    prev: Option<&Record>,
    new: Option<&Record>,
    id: &Value,
    prefilter: &Prefilter,
    field: &str,
) {
    let prev_in = prev.map_or(false, |p| state.record_in(p, prefilter));
    let new_in = new.map_or(false, |n| state.record_in(n, prefilter));
    let strategy = config.strategy_for(field);

    match (prev_in, new_in) {
        (false, false) => {}
        (true, true) => {
            let prev_value = prev.and_then(|p| p.get(field));
            let new_value = new.and_then(|n| n.get(field));
            if prev_value == new_value {
                return;
            }
            let value = new_value.cloned().unwrap_or(Value::Null);
            let mut desc = state.desc_list(prefilter, field);
            remove_id(&mut desc, id);
            insert_desc(&mut desc, id.clone(), &value, strategy, |other| {
                state.stored_field(other, field)
            });
            state.write_index_pair(prefilter, field, desc);
        }
        (true, false) => {
            let mut desc = state.desc_list(prefilter, field);
            remove_id(&mut desc, id);
            state.write_index_pair(prefilter, field, desc);
        }
        (false, true) => {
            let value = new.and_then(|n| n.get(field)).cloned().unwrap_or(Value::Null);
            let mut desc = state.desc_list(prefilter, field);
            insert_desc(&mut desc, id.clone(), &value, strategy, |other| {
                state.stored_field(other, field)
            });
            state.write_index_pair(prefilter, field, desc);
        }
    }
}

// ----------------------------------------------------------------------
// Uniques maintenance
// ----------------------------------------------------------------------

/// Applies one record transition to a `(prefilter, field)` uniques bundle.
///
/// Returns the distinct-value transitions, for view announcements.
fn update_uniques_for_field(
    state: &mut EntityState,
    prev: Option<&Record>,
    new: Option<&Record>,
    prefilter: &Prefilter,
    field: &str,
) -> Vec<UniquesEvent> {
    let prev_in = prev.map_or(false, |p| state.record_in(p, prefilter));
    let new_in = new.map_or(false, |n| state.record_in(n, prefilter));
    if !prev_in && !new_in {
        return Vec::new();
    }

    let prev_value = prev.and_then(|p| p.get(field)).cloned();
    let new_value = new.and_then(|n| n.get(field)).cloned();
    if prev_in && new_in && prev_value == new_value {
        return Vec::new();
    }

    let mut bundle = state.uniques_bundle(prefilter, field);
    let mut events = Vec::new();

    if prev_in {
        let value = prev_value.unwrap_or(Value::Null);
        let is_last = bundle.counts().get(&value) == Some(&1);
        bundle.remove(&value);
        if is_last {
            events.push(UniquesEvent::remove(value));
        }
    }
    if new_in {
        let value = new_value.unwrap_or(Value::Null);
        let is_new = !bundle.counts().contains_key(&value);
        bundle.add(value.clone());
        if is_new {
            events.push(UniquesEvent::add(value));
        }
    }

    state.persist_uniques(prefilter, field, bundle);
    events
}

// ----------------------------------------------------------------------
// Views
// ----------------------------------------------------------------------

fn apply_views(
    state: &mut EntityState,
    broadcaster: Option<&Arc<dyn Broadcaster>>,
    config: &EntityConfig,
    prev: Option<&Record>,
    new: Option<&Record>,
    id: &Value,
) {
    for (fingerprint, view) in state.views_cloned() {
        let scope = Prefilter::View(fingerprint.clone());
        let prev_in = prev.map_or(false, |p| state.record_in(p, &scope));
        let new_in = new.map_or(false, |n| state.record_in(n, &scope));

        for field in &config.fields {
            update_index_for_field(state, config, prev, new, id, &scope, &field.name);
        }

        let mut uniques_changes = Vec::new();
        for unique in &view.maintain_unique {
            let events = update_uniques_for_field(state, prev, new, &scope, unique);
            if !events.is_empty() {
                uniques_changes.push((unique.clone(), events));
            }
        }

        let Some(broadcaster) = broadcaster else {
            continue;
        };

        match (prev_in, new_in) {
            (false, true) => broadcaster.publish(
                &fingerprint,
                ViewMessage::Add {
                    fingerprint: fingerprint.clone(),
                    record: new.cloned().unwrap_or_default(),
                },
            ),
            (true, false) => broadcaster.publish(
                &fingerprint,
                ViewMessage::Remove {
                    fingerprint: fingerprint.clone(),
                    id: id.clone(),
                },
            ),
            (true, true) => broadcaster.publish(
                &fingerprint,
                ViewMessage::Update {
                    fingerprint: fingerprint.clone(),
                    record: new.cloned().unwrap_or_default(),
                },
            ),
            (false, false) => {}
        }

        for (field, events) in uniques_changes {
            broadcaster.publish(
                &fingerprint,
                ViewMessage::Uniques {
                    fingerprint: fingerprint.clone(),
                    field,
                    events,
                },
            );
        }
    }
}

// ----------------------------------------------------------------------
// Lookups
// ----------------------------------------------------------------------

fn apply_lookups(
    state: &mut EntityState,
    config: &EntityConfig,
    prev: Option<&Record>,
    new: Option<&Record>,
    id: &Value,
) {
    for field in &config.lookups {
        let prev_value = prev.and_then(|p| p.get(field)).cloned();
        let new_value = new.and_then(|n| n.get(field)).cloned();

        match (prev_value, new_value) {
            (None, Some(value)) => state.lookup_mut(field).add(value, id.clone()),
            (Some(old), Some(value)) => {
                if old != value {
                    state.lookup_mut(field).remove(&old, id);
                    state.lookup_mut(field).add(value, id.clone());
                }
            }
            (Some(old), None) => state.lookup_mut(field).remove(&old, id),
            (None, None) => {}
        }
    }
}
