//! SQLite implementation of [`RecordStore`].
//!
//! [`SqliteStore`] persists the record set in a single `records` table.
//! `replace` runs as one transaction (delete everything, insert every
//! record, commit), so a failure at any step rolls back and leaves the
//! previous contents intact.

use std::path::Path;

use rusqlite::{params, Connection};

use recsync_core::{Record, RecordId, RecordSet};

use crate::error::StorageError;
use crate::traits::{check_keys, RecordStore};

const COLUMNS: [&str; 4] = ["id", "dirty", "name", "content"];

/// SQLite-backed implementation of [`RecordStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    /// Deletes every row and inserts `records` inside one transaction.
    ///
    /// The transaction rolls back on drop unless `commit` is reached.
    fn write_all(&mut self, records: &RecordSet) -> Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM records", [])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO records (id, dirty, name, content) VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut ids: Vec<RecordId> = records.keys().copied().collect();
            ids.sort();
            for id in ids {
                let record = &records[&id];
                stmt.execute(params![record.id.0, record.dirty, record.name, record.content])?;
            }
        }
        tx.commit()
    }
}

impl RecordStore for SqliteStore {
    fn load(&self) -> Result<RecordSet, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, dirty, name, content FROM records")?;
        let rows = stmt.query_map([], |row| {
            Ok(Record {
                id: RecordId(row.get(0)?),
                dirty: row.get(1)?,
                name: row.get(2)?,
                content: row.get(3)?,
            })
        })?;

        let mut records = RecordSet::new();
        for (index, row) in rows.enumerate() {
            let record = row.map_err(|e| column_error(e, index + 1))?;
            records.insert(record.id, record);
        }
        tracing::debug!(count = records.len(), "loaded records table");
        Ok(records)
    }

    fn replace(&mut self, records: &RecordSet) -> Result<(), StorageError> {
        check_keys(records)?;
        self.write_all(records).map_err(|e| {
            tracing::warn!(error = %e, "replace rolled back");
            StorageError::Transaction(e)
        })?;
        tracing::debug!(count = records.len(), "replaced records table");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

/// Maps value conversion failures on a stored row to [`StorageError::Parse`].
fn column_error(err: rusqlite::Error, row: usize) -> StorageError {
    let (column, reason) = match &err {
        rusqlite::Error::InvalidColumnType(idx, _, ty) => {
            (*idx, format!("unexpected {} value", ty))
        }
        rusqlite::Error::FromSqlConversionFailure(idx, _, source) => (*idx, source.to_string()),
        rusqlite::Error::IntegralValueOutOfRange(idx, value) => {
            (*idx, format!("{} out of range", value))
        }
        _ => return StorageError::Sqlite(err),
    };
    StorageError::Parse {
        location: format!("records row {}", row),
        field: COLUMNS.get(column).copied().unwrap_or("column"),
        reason,
    }
}
