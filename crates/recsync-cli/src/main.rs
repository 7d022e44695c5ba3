//! recsync command-line tool.
//!
//! Provides the `recsync` binary with subcommands for running sync cycles
//! against a record store: `ingest` merges a JSON batch into the store,
//! `process` hands every dirty record to a processor and clears the flags
//! it accepts, and `list` prints the store.
//!
//! Logs go to stderr (filter with `RUST_LOG`), so stdout stays
//! machine-readable.

mod processor;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recsync_core::Record;
use recsync_storage::{BackendKind, RecordStore, StoreConfig};
use recsync_sync::{RecordProcessor, SyncDriver, SyncError};

use crate::processor::{CommandProcessor, StdoutProcessor};

/// Dirty-flag record store sync tool.
#[derive(Parser)]
#[command(name = "recsync", about = "Dirty-flag record store sync tool")]
struct Cli {
    /// Storage backend: csv or sqlite.
    #[arg(short, long, env = "RECSYNC_BACKEND", default_value = "csv")]
    backend: BackendKind,

    /// Store location (default: data.csv or data.db, by backend).
    #[arg(short, long, env = "RECSYNC_STORE")]
    store: Option<PathBuf>,

    /// Flat-file only: replace via temp file and rename instead of rewriting in place.
    #[arg(long)]
    atomic_replace: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Merge a `{"items": [...]}` JSON batch into the store.
    Ingest {
        /// Read the batch from this file instead of stdin.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Hand each dirty record to a processor and clear the ones it accepts.
    Process {
        /// Program to run per record (record JSON on stdin). Without it,
        /// records are printed to stdout as JSON lines.
        #[arg(long)]
        exec: Option<String>,

        /// Arguments for the `--exec` program, given after `--`.
        #[arg(last = true)]
        exec_args: Vec<String>,
    },

    /// Print every record as JSON, sorted by id.
    List,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    process::exit(run(cli));
}

/// Runs one command.
///
/// Returns exit code: 0 = success, 1 = bad input, 2 = some records failed
/// processing, 3 = storage error.
fn run(cli: Cli) -> i32 {
    let config = StoreConfig {
        backend: cli.backend,
        path: cli.store,
        atomic_replace: cli.atomic_replace,
    };

    let store = match config.open() {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "Error: failed to open {} store '{}': {}",
                config.backend,
                config.resolved_path().display(),
                e
            );
            return 3;
        }
    };
    let mut driver = SyncDriver::new(store);

    match cli.command {
        Commands::Ingest { input } => run_ingest(&mut driver, input),
        Commands::Process { exec, exec_args } => {
            let mut processor: Box<dyn RecordProcessor> = match exec {
                Some(program) => Box::new(CommandProcessor::new(program, exec_args)),
                None => Box::new(StdoutProcessor),
            };
            run_process(&mut driver, processor.as_mut())
        }
        Commands::List => run_list(&driver),
    }
}

fn run_ingest(driver: &mut SyncDriver<Box<dyn RecordStore>>, input: Option<PathBuf>) -> i32 {
    let result = match &input {
        Some(path) => match File::open(path) {
            Ok(file) => driver.ingest_from_reader(file),
            Err(e) => {
                eprintln!("Error: failed to open input '{}': {}", path.display(), e);
                return 1;
            }
        },
        None => driver.ingest_from_reader(io::stdin().lock()),
    };

    match result {
        Ok(report) => {
            print_json(&report);
            0
        }
        Err(e) => report_error(e),
    }
}

fn run_process(
    driver: &mut SyncDriver<Box<dyn RecordStore>>,
    processor: &mut dyn RecordProcessor,
) -> i32 {
    match driver.process(processor) {
        Ok(report) if report.all_succeeded() => 0,
        Ok(report) => {
            eprintln!("{} record(s) left dirty:", report.failed.len());
            for (id, reason) in &report.failed {
                eprintln!("  - {}: {}", id, reason);
            }
            2
        }
        Err(e) => report_error(e),
    }
}

fn run_list(driver: &SyncDriver<Box<dyn RecordStore>>) -> i32 {
    match driver.records() {
        Ok(records) => {
            let mut records: Vec<Record> = records.into_values().collect();
            records.sort_by_key(|r| r.id);
            print_json(&records);
            0
        }
        Err(e) => report_error(e),
    }
}

fn report_error(err: SyncError) -> i32 {
    match err {
        SyncError::Input(_) | SyncError::Read(_) => {
            eprintln!("Error: {}", err);
            1
        }
        SyncError::Storage(_) => {
            eprintln!("Storage error: {}", err);
            3
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process_with_exec_args() {
        let cli = Cli::try_parse_from([
            "recsync", "--backend", "sqlite", "--store", "x.db", "process", "--exec", "handler",
            "--", "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.backend, BackendKind::Sqlite);
        match cli.command {
            Commands::Process { exec, exec_args } => {
                assert_eq!(exec.as_deref(), Some("handler"));
                assert_eq!(exec_args, vec!["--verbose".to_string()]);
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_process_exit_code_reflects_rejections() {
        use recsync_core::{record_set, RecordId};
        use recsync_storage::InMemoryStore;
        use recsync_sync::ProcessError;

        let store: Box<dyn RecordStore> = Box::new(InMemoryStore::with_records(record_set([
            Record::dirty(RecordId(1), "a", ""),
            Record::dirty(RecordId(2), "b", ""),
        ])));
        let mut driver = SyncDriver::new(store);

        let mut reject_two = |record: &Record| -> Result<(), ProcessError> {
            if record.id == RecordId(2) {
                Err(ProcessError::new("rejected"))
            } else {
                Ok(())
            }
        };
        assert_eq!(run_process(&mut driver, &mut reject_two), 2);

        let mut accept_all = |_: &Record| -> Result<(), ProcessError> { Ok(()) };
        assert_eq!(run_process(&mut driver, &mut accept_all), 0);
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["recsync", "--backend", "redis", "list"]).is_err());
    }
}
