//! Batch deduplication and validation.

use std::fmt;

use tracing::{debug, warn};

use crate::identity::IdentityTracker;
use crate::normalize::UniqueFieldSpec;
use crate::record::Record;

/// Why a candidate was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A mandatory field was missing or blank.
    MissingField(String),
    /// The identity on `field` was already claimed, by history or by an
    /// earlier candidate of the same batch.
    Collision { field: String, value: String },
    /// The candidate was valid and unique but the quota was already met.
    OverQuota,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingField(field) => write!(f, "missing mandatory field '{field}'"),
            RejectReason::Collision { field, value } => {
                write!(f, "duplicate {field} '{value}'")
            }
            RejectReason::OverQuota => write!(f, "quota already reached"),
        }
    }
}

/// A rejected candidate, by its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
}

/// Result of filtering one candidate batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<Record>,
    /// Collisions and over-quota candidates.
    pub duplicates: Vec<Rejection>,
    /// Candidates missing a mandatory field.
    pub invalid: Vec<Rejection>,
}

impl BatchOutcome {
    pub fn candidates(&self) -> usize {
        self.accepted.len() + self.duplicates.len() + self.invalid.len()
    }
}

/// Turns candidate batches into valid, globally unique records.
///
/// Candidates are processed in arrival order and the first one to claim an
/// identity wins.
#[derive(Debug, Clone)]
pub struct Accumulator {
    mandatory_fields: Vec<String>,
    tracker: IdentityTracker,
}

impl Accumulator {
    pub fn new(mandatory_fields: Vec<String>, unique_fields: Vec<UniqueFieldSpec>) -> Self {
        Self {
            mandatory_fields,
            tracker: IdentityTracker::new(unique_fields),
        }
    }

    /// Build an accumulator around an already loaded tracker.
    pub fn with_tracker(mandatory_fields: Vec<String>, tracker: IdentityTracker) -> Self {
        Self {
            mandatory_fields,
            tracker,
        }
    }

    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut IdentityTracker {
        &mut self.tracker
    }

    pub fn mandatory_fields(&self) -> &[String] {
        &self.mandatory_fields
    }

    /// Filter one batch, accepting at most `capacity` records.
    ///
    /// Accepted records claim every identity they carry before the next
    /// candidate is looked at. Rejected candidates claim nothing.
    pub fn accumulate(&mut self, batch: Vec<Record>, capacity: usize) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (index, record) in batch.into_iter().enumerate() {
            if let Some(field) = self
                .mandatory_fields
                .iter()
                .find(|field| !record.has_value(field))
            {
                debug!("Candidate {} rejected: missing '{}'", index, field);
                outcome.invalid.push(Rejection {
                    index,
                    reason: RejectReason::MissingField(field.clone()),
                });
                continue;
            }

            let identities: Vec<(String, String)> = self
                .tracker
                .specs()
                .iter()
                .filter_map(|spec| Some((spec.name.clone(), spec.identity_of(&record)?)))
                .collect();

            if let Some((field, value)) = identities
                .iter()
                .find(|(field, value)| self.tracker.is_claimed(field, value))
            {
                outcome.duplicates.push(Rejection {
                    index,
                    reason: RejectReason::Collision {
                        field: field.clone(),
                        value: value.clone(),
                    },
                });
                continue;
            }

            if outcome.accepted.len() >= capacity {
                outcome.duplicates.push(Rejection {
                    index,
                    reason: RejectReason::OverQuota,
                });
                continue;
            }

            for (field, value) in identities {
                self.tracker.claim(&field, value);
            }
            outcome.accepted.push(record);
        }

        if !outcome.duplicates.is_empty() {
            let sample: Vec<String> = outcome
                .duplicates
                .iter()
                .take(5)
                .map(|rejection| rejection.reason.to_string())
                .collect();
            warn!(
                "Filtered {} duplicates: {}",
                outcome.duplicates.len(),
                sample.join(", ")
            );
        }
        if !outcome.invalid.is_empty() {
            warn!("Filtered {} invalid candidates", outcome.invalid.len());
        }

        outcome
    }
}
