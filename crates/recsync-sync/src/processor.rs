//! The per-record processing collaborator.

use thiserror::Error;

use recsync_core::Record;

/// A processor rejected one record. The record stays dirty and the cycle
/// moves on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ProcessError {
    pub reason: String,
}

impl ProcessError {
    pub fn new(reason: impl Into<String>) -> Self {
        ProcessError {
            reason: reason.into(),
        }
    }
}

/// Handles one dirty record per call.
pub trait RecordProcessor {
    fn process(&mut self, record: &Record) -> Result<(), ProcessError>;
}

impl<F> RecordProcessor for F
where
    F: FnMut(&Record) -> Result<(), ProcessError>,
{
    fn process(&mut self, record: &Record) -> Result<(), ProcessError> {
        self(record)
    }
}
