//! Override persistence: one record, read whole, replaced whole, deleted whole.
//!
//! There is no locking and no version check against a stale read. When two
//! saves race, the last write wins.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::ThemefigError;
use crate::types::OverrideRecord;

/// Where the override record lives.
pub trait OverrideStore {
    /// The stored record, or `None` when nothing has been saved (or it was reset).
    fn get(&self) -> Result<Option<OverrideRecord>, ThemefigError>;
    /// Replace the stored record wholesale.
    fn set(&self, record: &OverrideRecord) -> Result<(), ThemefigError>;
    /// Remove the record. Removing an absent record is not an error.
    fn delete(&self) -> Result<(), ThemefigError>;
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RefCell<Option<OverrideRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: OverrideRecord) -> Self {
        Self {
            record: RefCell::new(Some(record)),
        }
    }
}

impl OverrideStore for MemoryStore {
    fn get(&self) -> Result<Option<OverrideRecord>, ThemefigError> {
        Ok(self.record.borrow().clone())
    }

    fn set(&self, record: &OverrideRecord) -> Result<(), ThemefigError> {
        *self.record.borrow_mut() = Some(record.clone());
        Ok(())
    }

    fn delete(&self) -> Result<(), ThemefigError> {
        self.record.borrow_mut().take();
        Ok(())
    }
}

/// A single pretty-printed JSON file, `{dir}/{option_name}.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: &Path, option_name: &str) -> Self {
        Self {
            path: dir.join(format!("{option_name}.json")),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideStore for JsonFileStore {
    fn get(&self) -> Result<Option<OverrideRecord>, ThemefigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ThemefigError::IoError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let record = serde_json::from_str(&content).map_err(|e| ThemefigError::JsonError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(record))
    }

    fn set(&self, record: &OverrideRecord) -> Result<(), ThemefigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ThemefigError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = serde_json::to_string_pretty(record).map_err(|e| ThemefigError::JsonError {
            path: self.path.clone(),
            source: e,
        })?;

        std::fs::write(&self.path, content).map_err(|e| ThemefigError::IoError {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), "override record written");
        Ok(())
    }

    fn delete(&self) -> Result<(), ThemefigError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "override record deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ThemefigError::IoError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
