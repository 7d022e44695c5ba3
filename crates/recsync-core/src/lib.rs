pub mod merge;
pub mod record;

// Re-export commonly used types
pub use merge::{merge, MergeStats};
pub use record::{record_set, IncomingRecord, IngestBatch, Record, RecordId, RecordSet};
