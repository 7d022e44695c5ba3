//! Record model shared by every backend and by the sync driver.
//!
//! A [`RecordSet`] is keyed by [`RecordId`], so the set can never hold two
//! records with the same id.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable record identifier, the merge key.
///
/// The inner `i64` aligns with SQLite's `INTEGER PRIMARY KEY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Set by ingest, cleared once a processor has handled the record.
    pub dirty: bool,
    pub name: String,
    /// Free-text payload, possibly empty.
    pub content: String,
}

impl Record {
    /// Builds a freshly ingested (dirty) record.
    pub fn dirty(id: RecordId, name: impl Into<String>, content: impl Into<String>) -> Self {
        Record {
            id,
            dirty: true,
            name: name.into(),
            content: content.into(),
        }
    }

    /// Builds a clean (already processed) record.
    pub fn clean(id: RecordId, name: impl Into<String>, content: impl Into<String>) -> Self {
        Record {
            dirty: false,
            ..Record::dirty(id, name, content)
        }
    }
}

/// The full contents of a store, one record per id.
pub type RecordSet = HashMap<RecordId, Record>;

/// Collects records into a [`RecordSet`]; later duplicates win.
pub fn record_set<I: IntoIterator<Item = Record>>(records: I) -> RecordSet {
    records.into_iter().map(|r| (r.id, r)).collect()
}

/// One item of an incoming update batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl IncomingRecord {
    pub fn new(id: i64, name: impl Into<String>, content: impl Into<String>) -> Self {
        IncomingRecord {
            id: RecordId(id),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// An ordered batch of incoming updates, as read from the `{"items": [...]}`
/// input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestBatch {
    #[serde(default)]
    pub items: Vec<IncomingRecord>,
}

impl IngestBatch {
    pub fn new(items: Vec<IncomingRecord>) -> Self {
        IngestBatch { items }
    }

    /// Decodes a batch from its JSON document form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
