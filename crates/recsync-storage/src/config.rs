//! Backend selection.
//!
//! The backend is chosen once at startup from a [`StoreConfig`] and handed
//! out as a `Box<dyn RecordStore>`, so nothing downstream depends on which
//! physical medium is in use.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::StorageError;
use crate::flat_file::CsvStore;
use crate::sqlite::SqliteStore;
use crate::traits::RecordStore;

/// The physical backends that can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Csv,
    Sqlite,
}

impl BackendKind {
    /// Store location used when none is configured.
    pub fn default_path(self) -> PathBuf {
        match self {
            BackendKind::Csv => PathBuf::from("data.csv"),
            BackendKind::Sqlite => PathBuf::from("data.db"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Csv => write!(f, "csv"),
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(BackendKind::Csv),
            "sqlite" | "sqlite3" => Ok(BackendKind::Sqlite),
            _ => Err(format!("unknown backend '{}', expected csv or sqlite", s)),
        }
    }
}

/// Everything needed to open a backend.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// Defaults to [`BackendKind::default_path`] when unset.
    pub path: Option<PathBuf>,
    /// Flat-file only: write a temp file and rename it over the target.
    pub atomic_replace: bool,
}

impl StoreConfig {
    pub fn new(backend: BackendKind) -> Self {
        StoreConfig {
            backend,
            ..Default::default()
        }
    }

    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| self.backend.default_path())
    }

    /// Opens the configured backend.
    pub fn open(&self) -> Result<Box<dyn RecordStore>, StorageError> {
        let path = self.resolved_path();
        tracing::debug!(backend = %self.backend, path = %path.display(), "opening store");
        let store: Box<dyn RecordStore> = match self.backend {
            BackendKind::Csv => {
                Box::new(CsvStore::new(path).with_atomic_replace(self.atomic_replace))
            }
            BackendKind::Sqlite => Box::new(SqliteStore::new(path)?),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("csv".parse::<BackendKind>().unwrap(), BackendKind::Csv);
        assert_eq!("SQLite".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert!("redis".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(StoreConfig::new(BackendKind::Csv).resolved_path(), PathBuf::from("data.csv"));
        assert_eq!(StoreConfig::new(BackendKind::Sqlite).resolved_path(), PathBuf::from("data.db"));
    }

    #[test]
    fn test_open_selects_backend() {
        let dir = tempfile::tempdir().unwrap();
        for (kind, file) in [(BackendKind::Csv, "data.csv"), (BackendKind::Sqlite, "data.db")] {
            let config = StoreConfig {
                backend: kind,
                path: Some(dir.path().join(file)),
                atomic_replace: false,
            };
            let store = config.open().unwrap();
            assert_eq!(store.backend_name(), kind.to_string());
            assert!(store.load().unwrap().is_empty());
        }
    }
}
