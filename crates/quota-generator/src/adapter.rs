//! The capability that produces candidate records.

use async_trait::async_trait;
use seed_core::{IdentityTracker, Record};
use thiserror::Error;

/// Errors an adapter can report for one request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The provider signalled overload, rate limiting or a timeout. Worth
    /// retrying after a pause.
    #[error("Transient provider error: {0}")]
    Transient(String),

    /// The provider answered but the reply held no usable records. Retried
    /// within a batch; fatal once the attempts run out.
    #[error("Unparseable provider response: {0}")]
    Unparseable(String),

    /// Authentication failure or anything else retrying cannot fix.
    #[error("Fatal adapter error: {0}")]
    Fatal(String),
}

impl AdapterError {
    pub fn is_transient(&self) -> bool {
        matches!(self, AdapterError::Transient(_) | AdapterError::Unparseable(_))
    }
}

/// Recently claimed values of one unique field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldExclusions {
    pub field: String,
    pub values: Vec<String>,
}

/// What the adapter should steer away from.
///
/// Built fresh before every request from the live identity tracker, so each
/// batch sees the result of every batch before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionContext {
    /// Records already held, from history and this run.
    pub existing_count: usize,
    /// Most recent claimed values per unique field, in field order.
    pub fields: Vec<FieldExclusions>,
}

impl ExclusionContext {
    /// Sample the last `sample_size` claims of every tracked field.
    pub fn from_tracker(tracker: &IdentityTracker, existing_count: usize, sample_size: usize) -> Self {
        let fields = tracker
            .specs()
            .iter()
            .map(|spec| FieldExclusions {
                field: spec.name.clone(),
                values: tracker.recent(&spec.name, sample_size).to_vec(),
            })
            .collect();
        Self {
            existing_count,
            fields,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.values.is_empty())
    }
}

/// One request to an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// How many candidates to produce.
    pub batch_size: usize,
    /// 1-based batch counter for this run.
    pub batch_number: u64,
    /// 1-based attempt within this batch; above 1 after transient failures.
    pub attempt: u32,
    pub exclusions: ExclusionContext,
}

/// Produces candidate records, typically from a generative text model.
///
/// Output is untrusted: candidates may be missing fields, repeat each other,
/// or number more or fewer than requested. The driver validates everything.
#[async_trait]
pub trait BatchAdapter: Send + Sync {
    async fn generate(&self, request: &BatchRequest) -> Result<Vec<Record>, AdapterError>;
}
