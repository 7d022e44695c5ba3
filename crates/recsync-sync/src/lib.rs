//! Sync cycles over a [`RecordStore`](recsync_storage::RecordStore).
//!
//! - **Ingest**: load, merge an incoming batch, replace.
//! - **Process**: load, hand each dirty record to a [`RecordProcessor`],
//!   clear the flag on success, replace.
//!
//! Each cycle is one unit of work. Nothing is retried here; a scheduler that
//! wants retries runs the cycle again.

pub mod driver;
pub mod error;
pub mod processor;

pub use driver::{IngestReport, ProcessReport, SyncDriver};
pub use error::SyncError;
pub use processor::{ProcessError, RecordProcessor};
