//! Storage abstraction for recsync record sets.
//!
//! Provides the [`RecordStore`] trait defining the load/replace contract that
//! all backends implement, plus [`CsvStore`], [`SqliteStore`] and
//! [`InMemoryStore`] as first-class backends.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`traits`]: RecordStore trait definition
//! - [`flat_file`]: CsvStore, the flat-file backend
//! - [`schema`]: SQL schema constants and connection setup
//! - [`sqlite`]: SqliteStore, the embedded-relational backend
//! - [`memory`]: InMemoryStore implementation
//! - [`config`]: backend selection at startup

pub mod config;
pub mod error;
pub mod flat_file;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

// Re-export key types for ergonomic use.
pub use config::{BackendKind, StoreConfig};
pub use error::StorageError;
pub use flat_file::CsvStore;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::RecordStore;
