//! Bulk index construction
//!
//! Warm validates every configuration up front, then materializes the
//! primary store, the global sorted pairs (honoring presort hints), every
//! prefilter partition with its uniques, and every lookup. Configuration is
//! immutable afterwards.

use std::collections::HashMap;

use super::errors::{EngineError, EngineResult};
use super::state::EntityState;
use super::Engine;
use crate::index::{sort_ids_asc, Prefilter, UniquesBundle};
use crate::observability::Logger;
use crate::record::Record;
use crate::schema::{validate_entity, ConfigError, EntityConfig, PrefilterConfig, WarmBatch};
use crate::value::{SortDirection, Value};

/// One entity's configuration and bulk data.
pub struct WarmEntry {
    /// Entity configuration
    pub config: EntityConfig,
    /// Records and optional presort hint
    pub data: WarmBatch,
}

impl WarmEntry {
    pub fn new(config: EntityConfig, data: WarmBatch) -> Self {
        Self { config, data }
    }
}

impl Engine {
    /// Builds an engine from per-entity configuration and bulk data.
    pub fn warm(entries: Vec<WarmEntry>) -> EngineResult<Engine> {
        let mut engine = Engine::new_empty();

        for entry in &entries {
            validate_entity(&entry.config, &entry.data)?;
        }

        for entry in entries {
            if engine.state(&entry.config.name).is_ok() {
                return Err(ConfigError::DuplicateEntity(entry.config.name).into());
            }
            let state = build_entity(entry.config, entry.data)?;
            Logger::info(
                "WARM_COMPLETE",
                &[
                    ("entity", Value::from(state.name())),
                    ("records", Value::from(state.record_count() as i64)),
                ],
            );
            engine.insert_state(state);
        }

        Ok(engine)
    }
}

fn build_entity(config: EntityConfig, batch: WarmBatch) -> EngineResult<EntityState> {
    let mut state = EntityState::new(config.clone());

    let mut ids = Vec::with_capacity(batch.records.len());
    for record in &batch.records {
        let id = extract_id(&config, record)?;
        for field in config.required_fields() {
            if !record.contains(field) {
                return Err(EngineError::MissingField(field.to_string()));
            }
        }
        state.insert_record(id.clone(), record.clone());
        ids.push(id);
    }

    build_global_pairs(&mut state, &config, &batch, &ids);
    build_prefilter_scopes(&mut state, &config, &batch, &ids);
    build_lookups(&mut state, &config, &batch, &ids);

    Ok(state)
}

/// Global sorted pairs; a matching hint direction is taken verbatim and the
/// other direction is its exact reverse, with no sort.
fn build_global_pairs(state: &mut EntityState, config: &EntityConfig, batch: &WarmBatch, ids: &[Value]) {
    for field in &config.fields {
        let hinted = batch
            .hint
            .as_ref()
            .filter(|hint| hint.field == field.name)
            .map(|hint| hint.direction);

        let asc = match hinted {
            Some(SortDirection::Asc) => ids.to_vec(),
            Some(SortDirection::Desc) => ids.iter().rev().cloned().collect(),
            None => sort_ids_asc(ids.to_vec(), field.strategy, |id| {
                state.stored_field(id, &field.name)
            }),
        };

        let desc: Vec<Value> = asc.into_iter().rev().collect();
        state.write_index_pair(&Prefilter::Global, &field.name, desc);
    }
}

fn build_prefilter_scopes(
    state: &mut EntityState,
    config: &EntityConfig,
    batch: &WarmBatch,
    ids: &[Value],
) {
    // Fields maintained under any prefilter get a global bundle too
    for field in config.global_maintain_unique() {
        let bundle = UniquesBundle::from_values(
            batch
                .records
                .iter()
                .map(|r| r.get(&field).cloned().unwrap_or(Value::Null)),
        );
        state.persist_uniques(&Prefilter::Global, &field, bundle);
    }

    for prefilter in config.effective_prefilters() {
        if let Some(pf_key) = &prefilter.field {
            build_partitions(state, config, &prefilter, pf_key, batch, ids);
        }
    }
}

fn build_partitions(
    state: &mut EntityState,
    config: &EntityConfig,
    prefilter: &PrefilterConfig,
    pf_key: &str,
    batch: &WarmBatch,
    ids: &[Value],
) {
    // The global bundle for the prefilter field is how callers discover
    // which partition values exist.
    let discovery = UniquesBundle::from_values(
        batch
            .records
            .iter()
            .map(|r| r.get(pf_key).cloned().unwrap_or(Value::Null)),
    );
    state.persist_uniques(&Prefilter::Global, pf_key, discovery);

    let mut groups: HashMap<Value, Vec<usize>> = HashMap::new();
    for (position, record) in batch.records.iter().enumerate() {
        let value = record.get(pf_key).cloned().unwrap_or(Value::Null);
        groups.entry(value).or_default().push(position);
    }

    for (value, positions) in groups {
        let scope = Prefilter::Field {
            field: pf_key.to_string(),
            value,
        };
        let group_ids: Vec<Value> = positions.iter().map(|&p| ids[p].clone()).collect();

        for field in &config.fields {
            let asc = sort_ids_asc(group_ids.clone(), field.strategy, |id| {
                state.stored_field(id, &field.name)
            });
            let desc: Vec<Value> = asc.into_iter().rev().collect();
            state.write_index_pair(&scope, &field.name, desc);
        }

        for unique in &prefilter.maintain_unique {
            let bundle = UniquesBundle::from_values(
                positions
                    .iter()
                    .map(|&p| batch.records[p].get(unique).cloned().unwrap_or(Value::Null)),
            );
            state.persist_uniques(&scope, unique, bundle);
        }
    }
}

fn build_lookups(state: &mut EntityState, config: &EntityConfig, batch: &WarmBatch, ids: &[Value]) {
    for field in &config.lookups {
        for (record, id) in batch.records.iter().zip(ids) {
            let value = record.get(field).cloned().unwrap_or(Value::Null);
            state.lookup_mut(field).add(value, id.clone());
        }
    }
}

pub(crate) fn extract_id(config: &EntityConfig, record: &Record) -> EngineResult<Value> {
    config.id_key.extract(record).ok_or_else(|| {
        EngineError::MissingField(config.id_key.field_name().unwrap_or("id").to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use crate::record::IdKey;
    use crate::schema::{FieldConfig, SortHint};

    fn cars_config() -> EntityConfig {
        EntityConfig::new(
            "cars",
            IdKey::field("id"),
            vec![FieldConfig::natural("make")],
        )
    }

    fn cars_data() -> Vec<Record> {
        vec![
            record! { "id" => 1, "make" => "Lamborghini" },
            record! { "id" => 2, "make" => "Mazda" },
        ]
    }

    #[test]
    fn test_warm_builds_primary_store() {
        let engine = Engine::warm(vec![WarmEntry::new(
            cars_config(),
            WarmBatch::new(cars_data()),
        )])
        .unwrap();

        let state = engine.state("cars").unwrap();
        assert_eq!(state.record_count(), 2);
        assert_eq!(
            state.record(&Value::Int(1)),
            Some(&record! { "id" => 1, "make" => "Lamborghini" })
        );
    }

    #[test]
    fn test_warm_builds_mirrored_pairs() {
        let engine = Engine::warm(vec![WarmEntry::new(
            cars_config(),
            WarmBatch::new(cars_data()),
        )])
        .unwrap();

        let state = engine.state("cars").unwrap();
        let asc = state.ids(&Prefilter::Global, "make", SortDirection::Asc).unwrap();
        let desc = state.ids(&Prefilter::Global, "make", SortDirection::Desc).unwrap();

        assert_eq!(asc, &vec![Value::Int(1), Value::Int(2)]);
        let mirrored: Vec<Value> = desc.iter().rev().cloned().collect();
        assert_eq!(asc, &mirrored);
    }

    #[test]
    fn test_warm_hint_taken_verbatim() {
        // Input deliberately violates the claimed order; a matching hint
        // means no sort happens.
        let records = vec![
            record! { "id" => 2, "make" => "Mazda" },
            record! { "id" => 1, "make" => "Lamborghini" },
        ];
        let engine = Engine::warm(vec![WarmEntry::new(
            cars_config(),
            WarmBatch::sorted_by(records, "make", SortDirection::Asc),
        )])
        .unwrap();

        let state = engine.state("cars").unwrap();
        let asc = state.ids(&Prefilter::Global, "make", SortDirection::Asc).unwrap();
        assert_eq!(asc, &vec![Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn test_warm_rejects_unknown_hint_field() {
        let result = Engine::warm(vec![WarmEntry::new(
            cars_config(),
            WarmBatch::sorted_by(cars_data(), "wheels", SortDirection::Asc),
        )]);

        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::UnknownHintField { .. }))
        ));
    }

    #[test]
    fn test_warm_rejects_missing_field() {
        let result = Engine::warm(vec![WarmEntry::new(
            cars_config(),
            WarmBatch::new(vec![record! { "id" => 1 }]),
        )]);

        assert_eq!(result.err(), Some(EngineError::MissingField("make".into())));
    }

    #[test]
    fn test_warm_rejects_duplicate_entity() {
        let result = Engine::warm(vec![
            WarmEntry::new(cars_config(), WarmBatch::new(vec![])),
            WarmEntry::new(cars_config(), WarmBatch::new(vec![])),
        ]);

        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::DuplicateEntity(_)))
        ));
    }

    #[test]
    fn test_warm_empty_entity_has_no_index_entries() {
        let engine = Engine::warm(vec![WarmEntry::new(cars_config(), WarmBatch::new(vec![]))])
            .unwrap();

        let state = engine.state("cars").unwrap();
        assert_eq!(state.ids(&Prefilter::Global, "make", SortDirection::Asc), None);
    }
}
