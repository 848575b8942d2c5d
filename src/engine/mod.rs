//! The indexing engine
//!
//! Warm builds every derived structure from bulk data; `put` and `drop_record`
//! keep them mutually consistent record by record. The engine is a
//! single-owner structure: mutations take `&mut self` and the caller
//! serializes them, reads take `&self` and may run in parallel with each
//! other.
//!
//! # Invariants
//!
//! - The ascending list equals the reverse of the descending list for every
//!   `(prefilter, field)`
//! - Every sorted list holds exactly the ids whose records fall under its
//!   prefilter
//! - A mutation is observable atomically; readers never see a record in the
//!   primary store but missing from an index it belongs to

mod errors;
mod mutate;
mod reads;
mod state;
mod views;
mod warm;

pub use errors::{EngineError, EngineResult};
pub use state::EntityState;
pub use warm::WarmEntry;

use std::collections::HashMap;
use std::sync::Arc;

use crate::pubsub::Broadcaster;

/// The in-memory multi-index record store.
pub struct Engine {
    entities: HashMap<String, EntityState>,
    broadcaster: Option<Arc<dyn Broadcaster>>,
}

impl Engine {
    /// Attaches a pub/sub sink for view delta announcements
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    /// Warmed entity names
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(String::as_str).collect()
    }

    pub(crate) fn new_empty() -> Self {
        Self {
            entities: HashMap::new(),
            broadcaster: None,
        }
    }

    pub(crate) fn state(&self, entity: &str) -> EngineResult<&EntityState> {
        self.entities
            .get(entity)
            .ok_or_else(|| EngineError::UnknownEntity(entity.to_string()))
    }

    pub(crate) fn state_mut(&mut self, entity: &str) -> EngineResult<&mut EntityState> {
        self.entities
            .get_mut(entity)
            .ok_or_else(|| EngineError::UnknownEntity(entity.to_string()))
    }

    pub(crate) fn insert_state(&mut self, state: EntityState) {
        self.entities.insert(state.name().to_string(), state);
    }

    pub(crate) fn broadcaster(&self) -> Option<Arc<dyn Broadcaster>> {
        self.broadcaster.clone()
    }
}
