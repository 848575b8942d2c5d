//! prismdb - a deterministic, in-memory, multi-index record store
//!
//! Callers warm the engine with typed record collections and it maintains,
//! per entity: a primary store, asc/desc sorted id lists per field, value-
//! partitioned sub-indexes, registered filtered views, uniques bundles, and
//! reverse lookups. Mutations keep every derived structure consistent.

pub mod engine;
pub mod index;
pub mod observability;
pub mod paginate;
pub mod pubsub;
pub mod record;
pub mod schema;
pub mod value;
pub mod view;
