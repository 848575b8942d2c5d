//! Cursor-based pagination
//!
//! Pages walk a presorted id list. Forward paging resumes after an opaque
//! cursor; backward paging collects the ids preceding one. An optional
//! record filter and prepare step run per record; filtered-out records never
//! consume limit.
//!
//! Cursor fields are the order field plus an implicit id tiebreaker. Total
//! counts are never produced.

mod cursor;
mod errors;

pub use cursor::Cursor;
pub use errors::{CursorError, CursorResult};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::index::Prefilter;
use crate::record::Record;
use crate::value::{SortDirection, Value};

/// Records per page when no limit is given
pub const DEFAULT_LIMIT: usize = 10;

/// Options for one page request.
#[derive(Clone)]
pub struct PaginateOptions {
    /// Records per page
    pub limit: usize,
    /// Resume after this cursor
    pub after: Option<String>,
    /// Collect the page preceding this cursor
    pub before: Option<String>,
    /// Field and direction selecting the sorted index
    pub order_by: (String, SortDirection),
    /// Scope selecting the sorted index
    pub prefilter: Prefilter,
    /// Record-level filter; rejected records never consume limit
    pub filter: Option<Arc<dyn Fn(&Record) -> bool + Send + Sync>>,
    /// Applied to each record before filtering and before return
    pub prepare: Option<Arc<dyn Fn(Record) -> Record + Send + Sync>>,
    /// Cursor id field; defaults to the entity's id field
    pub id_field: Option<String>,
}

impl PaginateOptions {
    /// Page over `(field, dir)` with defaults everywhere else
    pub fn order_by(field: impl Into<String>, dir: SortDirection) -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            after: None,
            before: None,
            order_by: (field.into(), dir),
            prefilter: Prefilter::Global,
            filter: None,
            prepare: None,
            id_field: None,
        }
    }

    /// Sets the page size
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Resumes after a cursor
    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Pages backward from a cursor
    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    /// Scopes to a prefilter
    pub fn with_prefilter(mut self, prefilter: Prefilter) -> Self {
        self.prefilter = prefilter;
        self
    }

    /// Adds a record-level filter
    pub fn with_filter(mut self, filter: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Adds a prepare step
    pub fn with_prepare(
        mut self,
        prepare: impl Fn(Record) -> Record + Send + Sync + 'static,
    ) -> Self {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    /// Overrides the cursor id field
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = Some(id_field.into());
        self
    }
}

/// One page of records plus paging metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in index order
    pub entries: Vec<Record>,
    /// Cursors and limits
    pub metadata: PageMetadata,
}

/// Metadata returned with every page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMetadata {
    /// Cursor resuming after this page, when more records follow
    pub after: Option<String>,
    /// Cursor paging back before this page
    pub before: Option<String>,
    /// The applied limit
    pub limit: usize,
    /// Never produced by this engine
    pub total_count: Option<usize>,
    /// Never produced by this engine
    pub total_count_cap_exceeded: bool,
}

impl PageMetadata {
    fn new(after: Option<String>, before: Option<String>, limit: usize) -> Self {
        Self {
            after,
            before,
            limit,
            total_count: None,
            total_count_cap_exceeded: false,
        }
    }
}

/// Pages over a presorted id list.
///
/// `get_record` resolves ids; `id_of` extracts a record's id for cursor
/// construction; `id_field` names the cursor's id entry.
pub fn paginate_ids(
    ids: &[Value],
    get_record: impl Fn(&Value) -> Option<Record>,
    id_of: impl Fn(&Record) -> Option<Value>,
    id_field: &str,
    options: &PaginateOptions,
) -> CursorResult<Page> {
    if options.after.is_some() && options.before.is_some() {
        return Err(CursorError::ConflictingCursors);
    }

    let mut cursor_fields = vec![options.order_by.0.clone()];
    if !cursor_fields.contains(&id_field.to_string()) {
        cursor_fields.push(id_field.to_string());
    }

    let fetch = |id: &Value| -> Option<Record> {
        let record = get_record(id)?;
        Some(match &options.prepare {
            Some(prepare) => prepare(record),
            None => record,
        })
    };
    let passes = |record: &Record| options.filter.as_ref().map_or(true, |f| f(record));
    let cursor_for = |record: &Record| -> Cursor {
        let mut fields = BTreeMap::new();
        for field in &cursor_fields {
            let value = if field == id_field {
                id_of(record).unwrap_or(Value::Null)
            } else {
                record.get(field).cloned().unwrap_or(Value::Null)
            };
            fields.insert(field.clone(), value);
        }
        Cursor::new(fields)
    };

    if let Some(before) = &options.before {
        paginate_backward(ids, before, id_field, options, fetch, passes, cursor_for)
    } else {
        paginate_forward(ids, id_field, options, fetch, passes, cursor_for)
    }
}

fn paginate_forward(
    ids: &[Value],
    id_field: &str,
    options: &PaginateOptions,
    fetch: impl Fn(&Value) -> Option<Record>,
    passes: impl Fn(&Record) -> bool,
    cursor_for: impl Fn(&Record) -> Cursor,
) -> CursorResult<Page> {
    let after_id = match &options.after {
        Some(encoded) => {
            let cursor = Cursor::decode(encoded)?;
            Some(cursor.get(id_field).cloned().ok_or(CursorError::BadCursor)?)
        }
        None => None,
    };

    let mut read_ids: Vec<Value> = Vec::new();
    let mut scanning = after_id.is_none();
    let mut entries: Vec<Record> = Vec::new();
    let mut cursor_before = None;
    let mut cursor_after = None;

    for id in ids {
        if !scanning {
            read_ids.push(id.clone());
            if after_id.as_ref() == Some(id) {
                scanning = true;
            }
            continue;
        }

        let Some(record) = fetch(id) else {
            continue;
        };
        if !passes(&record) {
            continue;
        }

        if entries.len() == options.limit {
            cursor_after = entries.last().map(&cursor_for);
            break;
        }

        if entries.is_empty() {
            let prior_match = options.filter.is_none()
                || read_ids
                    .iter()
                    .any(|rid| fetch(rid).map_or(false, |r| passes(&r)));
            if prior_match {
                cursor_before = Some(cursor_for(&record));
            }
        }

        entries.push(record);
    }

    Ok(Page {
        entries,
        metadata: PageMetadata::new(
            cursor_after.map(|c| c.encode()),
            cursor_before.map(|c| c.encode()),
            options.limit,
        ),
    })
}

fn paginate_backward(
    ids: &[Value],
    before: &str,
    id_field: &str,
    options: &PaginateOptions,
    fetch: impl Fn(&Value) -> Option<Record>,
    passes: impl Fn(&Record) -> bool,
    cursor_for: impl Fn(&Record) -> Cursor,
) -> CursorResult<Page> {
    let cursor = Cursor::decode(before)?;
    let before_id = cursor.get(id_field).cloned().ok_or(CursorError::BadCursor)?;

    let mut preceding: Vec<Value> = Vec::new();
    let mut found = false;
    for id in ids {
        if *id == before_id {
            found = true;
            break;
        }
        preceding.push(id.clone());
    }
    if !found {
        return Ok(Page {
            entries: Vec::new(),
            metadata: PageMetadata::new(None, None, options.limit),
        });
    }

    let mut collected: Vec<Record> = Vec::new();
    let mut cursor_before = None;
    let mut cursor_after = None;

    for id in preceding.iter().rev() {
        let Some(record) = fetch(id) else {
            continue;
        };
        if !passes(&record) {
            continue;
        }

        if collected.len() == options.limit {
            cursor_before = collected.last().map(&cursor_for);
            break;
        }

        if collected.is_empty() {
            cursor_after = Some(cursor_for(&record));
        }
        collected.push(record);
    }

    collected.reverse();

    Ok(Page {
        entries: collected,
        metadata: PageMetadata::new(
            cursor_after.map(|c| c.encode()),
            cursor_before.map(|c| c.encode()),
            options.limit,
        ),
    })
}
