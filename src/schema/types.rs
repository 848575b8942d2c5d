//! Configuration types for entities, prefilters, and warm input

use crate::record::{IdKey, Record};
use crate::value::{SortDirection, SortStrategy};

/// A configured, sortable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    /// Field name
    pub name: String,
    /// How values of this field compare
    pub strategy: SortStrategy,
}

impl FieldConfig {
    /// A field compared by natural value order
    pub fn natural(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: SortStrategy::Natural,
        }
    }

    /// A field compared chronologically
    pub fn datetime(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: SortStrategy::Datetime,
        }
    }
}

/// One prefilter scope: the global scope (`field: None`) or one sorted-index
/// set per observed value of the named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefilterConfig {
    /// Partitioning field; None is the global scope
    pub field: Option<String>,
    /// Fields for which a uniques bundle is maintained in this scope
    pub maintain_unique: Vec<String>,
}

impl PrefilterConfig {
    /// Global-scope prefilter carrying uniques for the given fields.
    ///
    /// The global prefilter itself is implicit; declare it explicitly only
    /// to attach `maintain_unique` fields.
    pub fn global(maintain_unique: &[&str]) -> Self {
        Self {
            field: None,
            maintain_unique: maintain_unique.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Value-partitioned prefilter over the given field
    pub fn on_field(field: impl Into<String>, maintain_unique: &[&str]) -> Self {
        Self {
            field: Some(field.into()),
            maintain_unique: maintain_unique.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Immutable configuration for one entity.
#[derive(Debug, Clone)]
pub struct EntityConfig {
    /// Entity name
    pub name: String,
    /// How record ids are extracted
    pub id_key: IdKey,
    /// Ordered sortable fields; the first is the default order
    pub fields: Vec<FieldConfig>,
    /// Prefilter scopes; the global scope is implicit if not listed
    pub prefilters: Vec<PrefilterConfig>,
    /// Fields with a reverse value → ids map
    pub lookups: Vec<String>,
}

impl EntityConfig {
    /// Creates a configuration with an id field and sortable fields.
    pub fn new(name: impl Into<String>, id_key: IdKey, fields: Vec<FieldConfig>) -> Self {
        Self {
            name: name.into(),
            id_key,
            fields,
            prefilters: Vec::new(),
            lookups: Vec::new(),
        }
    }

    /// Adds a prefilter scope
    pub fn with_prefilter(mut self, prefilter: PrefilterConfig) -> Self {
        self.prefilters.push(prefilter);
        self
    }

    /// Adds reverse-lookup fields
    pub fn with_lookups(mut self, lookups: &[&str]) -> Self {
        self.lookups = lookups.iter().map(|s| s.to_string()).collect();
        self
    }

    /// The default order field
    pub fn first_field(&self) -> &FieldConfig {
        &self.fields[0]
    }

    /// Strategy for a configured field, Natural for anything else
    pub fn strategy_for(&self, field: &str) -> SortStrategy {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.strategy)
            .unwrap_or(SortStrategy::Natural)
    }

    /// True if the field is configured as sortable
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }

    /// Prefilter scopes with the implicit global scope made explicit.
    ///
    /// The global scope comes first; it carries no uniques unless declared.
    pub fn effective_prefilters(&self) -> Vec<PrefilterConfig> {
        let mut effective = Vec::with_capacity(self.prefilters.len() + 1);
        if !self.prefilters.iter().any(|pf| pf.field.is_none()) {
            effective.push(PrefilterConfig {
                field: None,
                maintain_unique: Vec::new(),
            });
        }
        let global_first = self.prefilters.iter().filter(|pf| pf.field.is_none());
        let partitioned = self.prefilters.iter().filter(|pf| pf.field.is_some());
        effective.extend(global_first.cloned());
        effective.extend(partitioned.cloned());
        effective
    }

    /// Fields with a uniques bundle in the global scope.
    ///
    /// A field named under any prefilter's `maintain_unique` keeps a global
    /// bundle too, so callers can read entity-wide distinct values. Partition
    /// fields are excluded; their global bundle is the discovery bundle the
    /// partition path maintains.
    pub fn global_maintain_unique(&self) -> Vec<String> {
        let partition_fields: Vec<&String> =
            self.prefilters.iter().filter_map(|pf| pf.field.as_ref()).collect();
        let mut fields = Vec::new();
        for prefilter in &self.prefilters {
            for unique in &prefilter.maintain_unique {
                if !fields.contains(unique) && !partition_fields.contains(&unique) {
                    fields.push(unique.clone());
                }
            }
        }
        fields
    }

    /// Every field a record must carry to be indexed under this entity
    pub fn required_fields(&self) -> Vec<&str> {
        let mut required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        for pf in &self.prefilters {
            if let Some(field) = &pf.field {
                if !required.contains(&field.as_str()) {
                    required.push(field);
                }
            }
            for unique in &pf.maintain_unique {
                if !required.contains(&unique.as_str()) {
                    required.push(unique);
                }
            }
        }
        for lookup in &self.lookups {
            if !required.contains(&lookup.as_str()) {
                required.push(lookup);
            }
        }
        required
    }
}

/// Declares that warm input arrives presorted by one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortHint {
    /// Field the input is sorted by
    pub field: String,
    /// Direction of the input order
    pub direction: SortDirection,
}

impl SortHint {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Bulk input for one entity at warm time.
#[derive(Debug, Clone, Default)]
pub struct WarmBatch {
    /// Records to index
    pub records: Vec<Record>,
    /// Optional presort declaration; a matching hint skips one sort
    pub hint: Option<SortHint>,
}

impl WarmBatch {
    /// Unsorted input
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            hint: None,
        }
    }

    /// Input presorted by the given field and direction
    pub fn sorted_by(records: Vec<Record>, field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            records,
            hint: Some(SortHint::new(field, direction)),
        }
    }
}
