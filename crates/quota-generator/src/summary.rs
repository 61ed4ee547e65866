//! Generation run results.

use std::fmt;

use seed_core::Record;

/// States of the quota-batch driver.
///
/// A run cycles `Sizing -> Requesting -> Accumulating -> Persisting` and ends
/// in `Done`, `Aborted` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Sizing,
    Requesting,
    Accumulating,
    Persisting,
    /// Quota reached.
    Done,
    /// Circuit breaker tripped or a fatal error occurred. Partial progress
    /// was kept.
    Aborted,
    /// Stopped at a batch boundary on request.
    Cancelled,
}

impl DriverState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DriverState::Done | DriverState::Aborted | DriverState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverState::Sizing => "sizing",
            DriverState::Requesting => "requesting",
            DriverState::Accumulating => "accumulating",
            DriverState::Persisting => "persisting",
            DriverState::Done => "done",
            DriverState::Aborted => "aborted",
            DriverState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters from one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub entity: String,
    /// Target record count.
    pub requested: usize,
    /// Records loaded from the store before the run.
    pub existing: usize,
    /// Records held at the end of the run.
    pub achieved: usize,
    /// Collisions plus over-quota candidates.
    pub duplicates_skipped: usize,
    pub invalid_skipped: usize,
    pub failed_batches: usize,
    pub adapter_calls: usize,
    pub state: DriverState,
    /// Set when the run ended because of a fatal adapter or storage error.
    pub fatal_error: Option<String>,
}

impl GenerationSummary {
    pub fn new(entity: impl Into<String>, requested: usize, existing: usize) -> Self {
        Self {
            entity: entity.into(),
            requested,
            existing,
            achieved: existing,
            duplicates_skipped: 0,
            invalid_skipped: 0,
            failed_batches: 0,
            adapter_calls: 0,
            state: DriverState::Sizing,
            fatal_error: None,
        }
    }

    /// Records added by this run.
    pub fn new_records(&self) -> usize {
        self.achieved.saturating_sub(self.existing)
    }

    /// Whether the quota was met.
    pub fn is_complete(&self) -> bool {
        self.achieved >= self.requested
    }

    pub fn is_aborted(&self) -> bool {
        self.state == DriverState::Aborted
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal_error.is_some()
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} generation {}: requested={} achieved={} new={} duplicates_skipped={} invalid_skipped={} failed_batches={}",
            self.entity,
            self.state,
            self.requested,
            self.achieved,
            self.new_records(),
            self.duplicates_skipped,
            self.invalid_skipped,
            self.failed_batches
        )?;
        if let Some(error) = &self.fatal_error {
            write!(f, " error=\"{error}\"")?;
        }
        Ok(())
    }
}

/// Records and counters returned by a finished run.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub records: Vec<Record>,
    pub summary: GenerationSummary,
}
