//! The capability that writes one record into a target platform.

use async_trait::async_trait;
use seed_core::Record;
use thiserror::Error;

/// Errors a sink can report for one record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The target refused the record (validation, conflict, bad reference).
    #[error("Rejected by target: {0}")]
    Rejected(String),

    /// The request never got a usable answer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credentials were refused. Every other record will fail the same way.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Other(String),
}

impl SinkError {
    /// Whether this failure is about the target as a whole rather than the
    /// one record.
    pub fn is_systemic(&self) -> bool {
        matches!(self, SinkError::Unauthorized(_))
    }
}

/// What the target reported back for a written record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkOutcome {
    /// Identifier the target assigned, when it returns one.
    pub external_id: Option<String>,
}

impl SinkOutcome {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            external_id: Some(id.into()),
        }
    }
}

/// Writes records into a target platform, one call per record.
///
/// Implementations own their timeouts and authentication. Calls may run
/// concurrently, so implementations must be safe to share.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, record: &Record) -> Result<SinkOutcome, SinkError>;
}
