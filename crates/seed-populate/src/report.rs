//! Seeding report types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use seed_core::Record;
use serde::Serialize;

/// Which input record a result is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    /// Position in the seeded slice.
    pub index: usize,
    /// Display label, from the configured label field or the index.
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStatus {
    Succeeded,
    Failed,
}

/// Outcome of seeding one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedingResult {
    pub record_ref: RecordRef,
    pub status: SeedStatus,
    pub external_id: Option<String>,
    pub detail: Option<String>,
    /// The failure concerned the target as a whole (e.g. refused credentials).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub systemic: bool,
}

impl SeedingResult {
    pub fn succeeded(record_ref: RecordRef, external_id: Option<String>) -> Self {
        Self {
            record_ref,
            status: SeedStatus::Succeeded,
            external_id,
            detail: None,
            systemic: false,
        }
    }

    pub fn failed(record_ref: RecordRef, detail: impl Into<String>, systemic: bool) -> Self {
        Self {
            record_ref,
            status: SeedStatus::Failed,
            external_id: None,
            detail: Some(detail.into()),
            systemic,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SeedStatus::Succeeded
    }
}

/// Aggregate of one seeding run.
#[derive(Debug, Clone, Serialize)]
pub struct SeedingReport {
    pub entity: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// One result per input record, ordered by record index.
    pub per_record: Vec<SeedingResult>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl SeedingReport {
    pub fn new(
        entity: impl Into<String>,
        mut per_record: Vec<SeedingResult>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        per_record.sort_by_key(|result| result.record_ref.index);
        let succeeded = per_record.iter().filter(|r| r.is_success()).count();
        Self {
            entity: entity.into(),
            total: per_record.len(),
            succeeded,
            failed: per_record.len() - succeeded,
            per_record,
            started_at,
            elapsed,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &SeedingResult> {
        self.per_record.iter().filter(|r| !r.is_success())
    }

    /// Every record failed. Usually means the target itself is unusable.
    pub fn is_systemic_failure(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }

    /// Calculate records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.total as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} seeding complete: total={} succeeded={} failed={} in {:?}",
            self.entity, self.total, self.succeeded, self.failed, self.elapsed
        )
    }

    /// Tag seeded records with the identifiers the target assigned.
    ///
    /// `records` must be the slice that was seeded. Returns how many records
    /// were tagged.
    pub fn apply_external_ids(&self, records: &mut [Record], field: &str) -> usize {
        let mut tagged = 0;
        for result in &self.per_record {
            let (Some(id), Some(record)) = (
                result.external_id.as_ref(),
                records.get_mut(result.record_ref.index),
            ) else {
                continue;
            };
            record.insert(field, id.clone());
            tagged += 1;
        }
        tagged
    }
}
