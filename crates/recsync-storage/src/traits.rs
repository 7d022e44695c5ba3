//! The [`RecordStore`] trait defining the storage contract for record sets.
//!
//! The contract is deliberately whole-set: `load` returns everything and
//! `replace` overwrites everything. Merge and processing logic only ever
//! sees a [`RecordSet`], never a backend-specific type.

use recsync_core::RecordSet;

use crate::error::StorageError;

/// A physical medium holding one record set.
///
/// The trait is synchronous and assumes a single writer process.
pub trait RecordStore {
    /// Returns the full current contents.
    ///
    /// A medium that does not exist yet loads as an empty set. Any malformed
    /// record aborts the whole load; partial sets are never returned.
    fn load(&self) -> Result<RecordSet, StorageError>;

    /// Overwrites the entire contents with exactly `records`.
    ///
    /// After a successful return, a subsequent `load` observes `records`.
    /// Whether a failed call preserves the prior contents depends on the
    /// backend; see each implementation.
    fn replace(&mut self, records: &RecordSet) -> Result<(), StorageError>;

    /// Short backend name used in logs.
    fn backend_name(&self) -> &'static str;
}

/// Rejects a set where some record is filed under a key other than its id.
///
/// Backends call this before touching the medium, so a bad set leaves the
/// prior contents in place on every backend.
pub fn check_keys(records: &RecordSet) -> Result<(), StorageError> {
    match records.iter().find(|(key, record)| **key != record.id) {
        Some((key, record)) => Err(StorageError::KeyMismatch {
            key: key.0,
            id: record.id.0,
        }),
        None => Ok(()),
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load(&self) -> Result<RecordSet, StorageError> {
        (**self).load()
    }

    fn replace(&mut self, records: &RecordSet) -> Result<(), StorageError> {
        (**self).replace(records)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
