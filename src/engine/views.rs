//! View lifecycle
//!
//! `create_view` materializes every fingerprint-scoped structure before the
//! view becomes visible in the registry; `destroy_view` unregisters the view
//! first, so readers who miss the registry entry see no derived entries
//! either.

use super::errors::{EngineError, EngineResult};
use super::Engine;
use crate::index::{sort_ids_asc, Prefilter, UniquesBundle};
use crate::observability::Logger;
use crate::value::{SortDirection, Value};
use crate::view::ViewSpec;

impl Engine {
    /// Registers a view and builds its sorted pairs and uniques.
    ///
    /// The baseline id set is read from the entity's first field under the
    /// view's base prefilter, then narrowed by the predicate.
    pub fn create_view(
        &mut self,
        entity: &str,
        fingerprint: &str,
        view: ViewSpec,
    ) -> EngineResult<ViewSpec> {
        let state = self.state_mut(entity)?;
        if state.view(fingerprint).is_some() {
            return Err(EngineError::DuplicateView(fingerprint.to_string()));
        }

        let config = state.config().clone();
        let base_field = config.first_field().name.clone();

        let baseline = state
            .ids(&view.prefilter, &base_field, SortDirection::Asc)
            .cloned()
            .unwrap_or_default();
        let members: Vec<Value> = baseline
            .into_iter()
            .filter(|id| state.record(id).map_or(false, |r| view.admits(r)))
            .collect();

        let scope = Prefilter::View(fingerprint.to_string());
        for field in &config.fields {
            let asc = if field.name == base_field {
                members.clone()
            } else {
                sort_ids_asc(members.clone(), field.strategy, |id| {
                    state.stored_field(id, &field.name)
                })
            };
            let desc: Vec<Value> = asc.into_iter().rev().collect();
            state.write_index_pair(&scope, &field.name, desc);
        }

        for unique in &view.maintain_unique {
            let bundle = UniquesBundle::from_values(
                members
                    .iter()
                    .map(|id| state.stored_field(id, unique).unwrap_or(Value::Null)),
            );
            state.persist_uniques(&scope, unique, bundle);
        }

        state.insert_view(fingerprint.to_string(), view.clone());

        Logger::info(
            "VIEW_CREATED",
            &[
                ("entity", Value::from(entity)),
                ("fingerprint", Value::from(fingerprint)),
                ("members", Value::from(members.len() as i64)),
            ],
        );
        Ok(view)
    }

    /// Unregisters a view and deletes every fingerprint-scoped entry.
    pub fn destroy_view(&mut self, entity: &str, fingerprint: &str) -> EngineResult<()> {
        let state = self.state_mut(entity)?;

        let Some(view) = state.remove_view(fingerprint) else {
            return Err(EngineError::ViewNotFound(fingerprint.to_string()));
        };

        let config = state.config().clone();
        let scope = Prefilter::View(fingerprint.to_string());
        for field in &config.fields {
            state.delete_index_pair(&scope, &field.name);
        }
        for unique in &view.maintain_unique {
            state.delete_uniques(&scope, unique);
        }

        Logger::info(
            "VIEW_DESTROYED",
            &[("entity", Value::from(entity)), ("fingerprint", Value::from(fingerprint))],
        );
        Ok(())
    }
}
