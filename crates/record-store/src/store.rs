//! Record storage trait and error type.

use std::path::PathBuf;

use async_trait::async_trait;
use seed_core::Record;
use thiserror::Error;

/// Errors raised by storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not valid JSON.
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file is JSON but neither an array nor a single object.
    #[error("Unexpected data format in {}: expected a JSON array of objects", .0.display())]
    UnexpectedShape(PathBuf),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Trait for record storage operations.
///
/// A backend holds exactly one collection of records. `flush` replaces the
/// whole collection; there is no partial append.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Load every stored record.
    ///
    /// A backend with nothing stored yet returns an empty list.
    async fn load(&self) -> Result<Vec<Record>, StoreError>;

    /// Replace the stored collection with `records`.
    async fn flush(&self, records: &[Record]) -> Result<(), StoreError>;

    /// Human-readable location, used in log lines.
    fn describe(&self) -> String;
}
