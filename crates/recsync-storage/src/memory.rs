//! In-memory implementation of [`RecordStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and for dry runs
//! where persistence isn't wanted. `replace` swaps the whole set at once, so
//! it has the same all-or-nothing behaviour as the SQLite backend.

use recsync_core::RecordSet;

use crate::error::StorageError;
use crate::traits::{check_keys, RecordStore};

/// HashMap-backed implementation of [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: RecordSet,
    /// Number of successful `replace` calls.
    replace_count: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing set, as if it had been persisted earlier.
    pub fn with_records(records: RecordSet) -> Self {
        InMemoryStore {
            records,
            replace_count: 0,
        }
    }

    pub fn replace_count(&self) -> usize {
        self.replace_count
    }
}

impl RecordStore for InMemoryStore {
    fn load(&self) -> Result<RecordSet, StorageError> {
        Ok(self.records.clone())
    }

    fn replace(&mut self, records: &RecordSet) -> Result<(), StorageError> {
        check_keys(records)?;
        self.records = records.clone();
        self.replace_count += 1;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
