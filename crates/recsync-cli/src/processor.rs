//! Processors the binary can hand dirty records to.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use recsync_core::Record;
use recsync_sync::{ProcessError, RecordProcessor};

/// Writes each dirty record to stdout as one JSON line.
pub struct StdoutProcessor;

impl RecordProcessor for StdoutProcessor {
    fn process(&mut self, record: &Record) -> Result<(), ProcessError> {
        let line = serde_json::to_string(record)
            .map_err(|e| ProcessError::new(format!("failed to encode record: {}", e)))?;
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)
            .map_err(|e| ProcessError::new(format!("failed to write record: {}", e)))
    }
}

/// Runs an external program once per dirty record.
///
/// The record is written as JSON to the child's stdin and its id is exported
/// as `RECSYNC_RECORD_ID`. Exit status 0 means the record was handled.
pub struct CommandProcessor {
    program: String,
    args: Vec<String>,
}

impl CommandProcessor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandProcessor {
            program: program.into(),
            args,
        }
    }
}

impl RecordProcessor for CommandProcessor {
    fn process(&mut self, record: &Record) -> Result<(), ProcessError> {
        let payload = serde_json::to_vec(record)
            .map_err(|e| ProcessError::new(format!("failed to encode record: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("RECSYNC_RECORD_ID", record.id.to_string())
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| ProcessError::new(format!("failed to start '{}': {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A child may exit without reading its input; only the exit status counts.
            if let Err(e) = stdin.write_all(&payload) {
                tracing::debug!(id = %record.id, error = %e, "child closed stdin early");
            }
        }

        let status = child
            .wait()
            .map_err(|e| ProcessError::new(format!("failed to wait for '{}': {}", self.program, e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::new(format!("'{}' exited with {}", self.program, status)))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use recsync_core::RecordId;

    #[test]
    fn test_zero_exit_is_success() {
        let mut processor = CommandProcessor::new("true", vec![]);
        assert!(processor.process(&Record::dirty(RecordId(1), "n", "c")).is_ok());
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let mut processor = CommandProcessor::new("false", vec![]);
        let err = processor
            .process(&Record::dirty(RecordId(1), "n", "c"))
            .unwrap_err();
        assert!(err.reason.contains("exited with"));
    }

    #[test]
    fn test_child_sees_record_on_stdin() {
        let mut processor = CommandProcessor::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"grep -q '"name":"needle"' && [ "$RECSYNC_RECORD_ID" = 7 ]"#.to_string(),
            ],
        );
        assert!(processor.process(&Record::dirty(RecordId(7), "needle", "")).is_ok());
        assert!(processor.process(&Record::dirty(RecordId(8), "needle", "")).is_err());
    }

    #[test]
    fn test_missing_program_is_failure() {
        let mut processor = CommandProcessor::new("/nonexistent/recsync-handler", vec![]);
        let err = processor
            .process(&Record::dirty(RecordId(1), "n", "c"))
            .unwrap_err();
        assert!(err.reason.contains("failed to start"));
    }
}
