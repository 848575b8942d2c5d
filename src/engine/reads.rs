//! Read operations
//!
//! Reads never mutate; they return owned copies of records and values.
//! Referencing an unknown entity fails fast; an absent sub-index is an
//! empty result, never an error.

use std::collections::HashMap;

use super::errors::EngineResult;
use super::Engine;
use crate::index::Prefilter;
use crate::paginate::{paginate_ids, Page, PaginateOptions};
use crate::record::Record;
use crate::value::{SortDirection, Value};
use crate::view::ViewSpec;

impl Engine {
    /// A record by id
    pub fn get(&self, entity: &str, id: &Value) -> EngineResult<Option<Record>> {
        Ok(self.state(entity)?.record(id).cloned())
    }

    /// Records under a prefilter, in the given order.
    ///
    /// Defaults to the entity's first field ascending. Absent sub-indexes
    /// yield an empty list.
    pub fn get_records(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        order: Option<(&str, SortDirection)>,
    ) -> EngineResult<Vec<Record>> {
        let state = self.state(entity)?;
        let (field, dir) = match order {
            Some((field, dir)) => (field.to_string(), dir),
            None => (state.config().first_field().name.clone(), SortDirection::Asc),
        };

        let ids = state.ids(prefilter, &field, dir).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| state.record(id).cloned())
            .collect())
    }

    /// The id list under a prefilter, in the given order
    pub fn get_ids(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
        dir: SortDirection,
    ) -> EngineResult<Vec<Value>> {
        Ok(self
            .state(entity)?
            .ids(prefilter, field, dir)
            .cloned()
            .unwrap_or_default())
    }

    /// Records carrying a value, via the field's reverse lookup
    pub fn get_by(&self, entity: &str, field: &str, value: &Value) -> EngineResult<Vec<Record>> {
        let state = self.state(entity)?;
        let ids = state.lookup(field).map(|l| l.get(value).to_vec()).unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| state.record(id).cloned())
            .collect())
    }

    /// Distinct value counts for `(prefilter, field)`
    pub fn get_uniques_map(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
    ) -> EngineResult<HashMap<Value, usize>> {
        Ok(self.state(entity)?.uniques_counts(prefilter, field))
    }

    /// Sorted distinct values for `(prefilter, field)`
    pub fn get_uniques_list(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
    ) -> EngineResult<Vec<Value>> {
        Ok(self.state(entity)?.uniques_list(prefilter, field))
    }

    /// A registered view by fingerprint
    pub fn get_view(&self, entity: &str, fingerprint: &str) -> EngineResult<Option<ViewSpec>> {
        Ok(self.state(entity)?.view(fingerprint).cloned())
    }

    /// All registered views
    pub fn get_views(&self, entity: &str) -> EngineResult<HashMap<String, ViewSpec>> {
        Ok(self.state(entity)?.views().clone())
    }

    /// Cursor-based page over the sorted index the options select.
    pub fn paginate(&self, entity: &str, options: &PaginateOptions) -> EngineResult<Page> {
        let state = self.state(entity)?;
        let (field, dir) = &options.order_by;
        let ids = state
            .ids(&options.prefilter, field, *dir)
            .cloned()
            .unwrap_or_default();

        let id_field = options
            .id_field
            .clone()
            .or_else(|| state.config().id_key.field_name().map(String::from))
            .unwrap_or_else(|| "id".to_string());
        let id_key = state.config().id_key.clone();

        let page = paginate_ids(
            &ids,
            |id| state.record(id).cloned(),
            |record| id_key.extract(record),
            &id_field,
            options,
        )?;
        Ok(page)
    }
}
