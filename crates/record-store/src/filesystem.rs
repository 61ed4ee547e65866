//! JSON-file record storage implementation.

use async_trait::async_trait;
use seed_core::Record;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::store::{StorageBackend, StoreError};

/// Filesystem implementation of the StorageBackend trait.
///
/// Stores records as one pretty-printed JSON array. Every flush rewrites the
/// file through a sibling temporary file, so a crash mid-write leaves the
/// previous collection in place.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a new JsonFileStore for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl StorageBackend for JsonFileStore {
    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        if !self.path.exists() {
            tracing::info!(
                "Store {} does not exist yet, starting empty",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let records = match value {
            Value::Array(items) => {
                let total = items.len();
                let records: Vec<Record> = items.into_iter().filter_map(Record::from_value).collect();
                if records.len() < total {
                    tracing::warn!(
                        "Skipped {} non-object entries in {}",
                        total - records.len(),
                        self.path.display()
                    );
                }
                records
            }
            Value::Object(map) => vec![Record::from(map)],
            _ => return Err(StoreError::UnexpectedShape(self.path.clone())),
        };

        tracing::info!(
            "Loaded {} existing records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    async fn flush(&self, records: &[Record]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
