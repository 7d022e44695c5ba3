//! Error types for sync cycles.

use thiserror::Error;

use recsync_storage::StorageError;

/// A sync cycle failed outright. The store was not modified unless the
/// failure came from `replace` itself.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backend failed to load or replace.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The incoming batch document could not be decoded.
    #[error("invalid ingest input: {0}")]
    Input(#[from] serde_json::Error),

    /// The incoming batch could not be read.
    #[error("failed to read ingest input: {0}")]
    Read(#[from] std::io::Error),
}
