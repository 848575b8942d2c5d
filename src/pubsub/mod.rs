//! View delta broadcasting
//!
//! The engine announces view membership changes through an injected
//! broadcaster. Topics are view fingerprints; nothing else is baked into the
//! topic encoding. The engine emits only for fingerprint-scoped structures.

use std::sync::Mutex;

use serde::Serialize;
use serde_json::json;

use crate::record::Record;
use crate::value::Value;

/// Pub/sub sink supplied by the caller.
pub trait Broadcaster: Send + Sync {
    /// Delivers one message on a topic
    fn publish(&self, topic: &str, message: ViewMessage);
}

/// Direction of a uniques change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquesEventKind {
    Add,
    Remove,
}

/// One distinct-value transition within a view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniquesEvent {
    /// Whether the value appeared or disappeared
    pub kind: UniquesEventKind,
    /// The distinct value
    pub value: Value,
}

impl UniquesEvent {
    pub fn add(value: Value) -> Self {
        Self {
            kind: UniquesEventKind::Add,
            value,
        }
    }

    pub fn remove(value: Value) -> Self {
        Self {
            kind: UniquesEventKind::Remove,
            value,
        }
    }
}

/// A view delta announced after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewMessage {
    /// A record entered the view
    Add { fingerprint: String, record: Record },
    /// A record left the view
    Remove { fingerprint: String, id: Value },
    /// A view member changed in place
    Update { fingerprint: String, record: Record },
    /// Distinct values of a maintained field changed
    Uniques {
        fingerprint: String,
        field: String,
        events: Vec<UniquesEvent>,
    },
}

impl ViewMessage {
    /// The topic this message belongs on
    pub fn topic(&self) -> &str {
        match self {
            ViewMessage::Add { fingerprint, .. }
            | ViewMessage::Remove { fingerprint, .. }
            | ViewMessage::Update { fingerprint, .. }
            | ViewMessage::Uniques { fingerprint, .. } => fingerprint,
        }
    }

    /// JSON wire form for broadcaster implementations
    pub fn to_wire_format(&self) -> serde_json::Value {
        match self {
            ViewMessage::Add { fingerprint, record } => json!({
                "type": "add",
                "fingerprint": fingerprint,
                "record": record,
            }),
            ViewMessage::Remove { fingerprint, id } => json!({
                "type": "remove",
                "fingerprint": fingerprint,
                "id": id,
            }),
            ViewMessage::Update { fingerprint, record } => json!({
                "type": "update",
                "fingerprint": fingerprint,
                "record": record,
            }),
            ViewMessage::Uniques {
                fingerprint,
                field,
                events,
            } => json!({
                "type": "uniques",
                "fingerprint": fingerprint,
                "field": field,
                "events": events,
            }),
        }
    }
}

/// In-memory broadcaster that records every published message.
#[derive(Debug, Default)]
pub struct MemoryBroadcaster {
    published: Mutex<Vec<(String, ViewMessage)>>,
}

impl MemoryBroadcaster {
    /// Creates an empty broadcaster
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far
    pub fn published(&self) -> Vec<(String, ViewMessage)> {
        self.published.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Messages published on one topic
    pub fn on_topic(&self, topic: &str) -> Vec<ViewMessage> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, m)| m)
            .collect()
    }

    /// Number of published messages
    pub fn len(&self) -> usize {
        self.published.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// True when nothing was published
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Broadcaster for MemoryBroadcaster {
    fn publish(&self, topic: &str, message: ViewMessage) {
        if let Ok(mut published) = self.published.lock() {
            published.push((topic.to_string(), message));
        }
    }
}
