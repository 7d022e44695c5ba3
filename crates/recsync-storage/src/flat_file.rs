//! Flat-file implementation of [`RecordStore`].
//!
//! [`CsvStore`] keeps the record set in a CSV file with the header
//! `id,dirty,name,content` and one row per record. Fields use standard CSV
//! quoting, and `dirty` is written as `true`/`false`.
//!
//! # Durability
//!
//! By default `replace` truncates the file and rewrites it in place. A crash
//! or a failed write (disk full) in the middle of that leaves the file
//! truncated or partially written: there is no rollback, and the previous
//! contents are lost. Enable [`CsvStore::with_atomic_replace`] to write a
//! sibling temp file and rename it over the target instead.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use recsync_core::{Record, RecordId, RecordSet};

use crate::error::StorageError;
use crate::traits::{check_keys, RecordStore};

/// Column order of the flat file.
pub const HEADER: [&str; 4] = ["id", "dirty", "name", "content"];

/// CSV-file-backed implementation of [`RecordStore`].
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    atomic_replace: bool,
}

impl CsvStore {
    /// Uses the file at `path`. Nothing is touched until the first `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore {
            path: path.into(),
            atomic_replace: false,
        }
    }

    /// Switches `replace` to write-temp-then-rename.
    pub fn with_atomic_replace(mut self, enabled: bool) -> Self {
        self.atomic_replace = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replace_in_place(&self, records: &RecordSet) -> Result<(), StorageError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        let file = write_records(file, records)?;
        file.sync_all()?;
        Ok(())
    }

    fn replace_atomically(&self, records: &RecordSet) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        // Keep the target's mode rather than the temp file's 0600.
        if let Ok(meta) = fs::metadata(&self.path) {
            fs::set_permissions(tmp.path(), meta.permissions())?;
        }
        let file = write_records(tmp.as_file(), records)?;
        file.sync_all()?;
        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        sync_directory(dir)?;
        Ok(())
    }
}

/// Flushes a directory entry so a completed rename survives power loss.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> Result<(), StorageError> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

/// Directories cannot be opened for syncing here; the rename is durable on
/// its own.
#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> Result<(), StorageError> {
    Ok(())
}

impl RecordStore for CsvStore {
    fn load(&self) -> Result<RecordSet, StorageError> {
        // Reading needs only read access; the file is created on first run.
        let records = match File::open(&self.path) {
            Ok(file) => read_records(file)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&self.path)?;
                RecordSet::new()
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %self.path.display(), count = records.len(), "loaded flat file");
        Ok(records)
    }

    fn replace(&mut self, records: &RecordSet) -> Result<(), StorageError> {
        check_keys(records)?;
        if self.atomic_replace {
            self.replace_atomically(records)?;
        } else {
            self.replace_in_place(records)?;
        }
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            atomic = self.atomic_replace,
            "rewrote flat file"
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "csv"
    }
}

/// Parses a whole flat file. The first row is the header and is skipped.
///
/// A later row with an id already seen replaces the earlier one.
pub fn read_records<R: Read>(reader: R) -> Result<RecordSet, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut records = RecordSet::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, |pos| pos.line());
        let record = parse_row(&row, line)?;
        records.insert(record.id, record);
    }
    Ok(records)
}

/// Writes the header followed by one row per record, in ascending id order.
///
/// Returns the underlying writer so the caller can sync it.
pub fn write_records<W: Write>(writer: W, records: &RecordSet) -> Result<W, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    writer.write_record(HEADER)?;

    let mut ids: Vec<RecordId> = records.keys().copied().collect();
    ids.sort();
    for id in ids {
        let record = &records[&id];
        let id_field = record.id.0.to_string();
        writer.write_record([
            id_field.as_str(),
            format_dirty_flag(record.dirty),
            record.name.as_str(),
            record.content.as_str(),
        ])?;
    }

    writer.into_inner().map_err(|e| StorageError::Io(e.into_error()))
}

fn parse_row(row: &csv::StringRecord, line: u64) -> Result<Record, StorageError> {
    let field = |index: usize, name: &'static str| {
        row.get(index).ok_or_else(|| StorageError::Parse {
            location: format!("line {}", line),
            field: name,
            reason: "missing column".to_string(),
        })
    };

    let raw_id = field(0, "id")?;
    let id = raw_id.parse::<i64>().map_err(|e| StorageError::Parse {
        location: format!("line {}", line),
        field: "id",
        reason: format!("{:?}: {}", raw_id, e),
    })?;

    let raw_dirty = field(1, "dirty")?;
    let dirty = parse_dirty_flag(raw_dirty).ok_or_else(|| StorageError::Parse {
        location: format!("line {}", line),
        field: "dirty",
        reason: format!("{:?} is not a boolean", raw_dirty),
    })?;

    Ok(Record {
        id: RecordId(id),
        dirty,
        name: field(2, "name")?.to_string(),
        content: field(3, "content")?.to_string(),
    })
}

/// Accepts the usual spellings of a boolean flag.
pub fn parse_dirty_flag(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn format_dirty_flag(dirty: bool) -> &'static str {
    if dirty {
        "true"
    } else {
        "false"
    }
}
