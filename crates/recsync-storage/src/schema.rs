//! SQL schema constants and connection setup for the SQLite backend.
//!
//! The schema is a single table created on first connection. There is no
//! version tracking; the table layout is assumed stable.

use std::path::Path;

use rusqlite::Connection;

use crate::error::StorageError;

/// The `records` table.
pub const CREATE_RECORDS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS records (
    id      INTEGER PRIMARY KEY,
    dirty   BOOLEAN,
    name    TEXT,
    content TEXT
);";

/// Opens (or creates) a SQLite database at `path` with WAL mode and the
/// `records` table in place.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)?;
    configure_and_create(&conn)?;
    Ok(conn)
}

/// Opens an in-memory SQLite database with the `records` table in place.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    configure_and_create(&conn)?;
    Ok(conn)
}

/// Configures pragmas and creates the table if absent.
fn configure_and_create(conn: &Connection) -> Result<(), StorageError> {
    // WAL keeps readers off the writer's back; no-op for in-memory databases.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // NORMAL synchronous is safe with WAL mode.
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.execute_batch(CREATE_RECORDS_TABLE)?;
    Ok(())
}
