//! Storage error types for recsync-storage.
//!
//! [`StorageError`] covers the failure modes of both physical backends:
//! an unreachable medium, malformed stored fields, and failed relational
//! transactions.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be opened, read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The flat file is not well-formed CSV (bad quoting, wrong field count).
    #[error("flat-file format error: {0}")]
    Csv(#[from] csv::Error),

    /// A stored field could not be decoded into a record.
    #[error("malformed {field} at {location}: {reason}")]
    Parse {
        location: String,
        field: &'static str,
        reason: String,
    },

    /// A record set handed to `replace` filed a record under another id.
    /// Rejected before anything is written.
    #[error("record set key {key} holds record with id {id}")]
    KeyMismatch { key: i64, id: i64 },

    /// A SQLite operation outside of `replace` failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The `replace` transaction failed and was rolled back; the prior
    /// contents are intact.
    #[error("transaction rolled back: {0}")]
    Transaction(#[source] rusqlite::Error),
}

impl StorageError {
    /// True for errors that mean the stored data itself is bad, as opposed to
    /// the medium being unavailable.
    pub fn is_parse(&self) -> bool {
        matches!(self, StorageError::Parse { .. })
    }
}
