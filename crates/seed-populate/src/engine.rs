//! Bounded concurrent seeding engine.

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use seed_core::Record;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::report::{RecordRef, SeedingReport, SeedingResult};
use crate::sink::{Sink, SinkError, SinkOutcome};

/// Default number of sink calls in flight at once.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 4;

/// Raised by [`SeedingEngine::seed_checked`] when the target as a whole is
/// unusable.
#[derive(Error, Debug)]
pub enum SeedingError {
    #[error("Systemic failure seeding {entity}: {detail}")]
    Systemic { entity: String, detail: String },
}

/// Runs one sink call per record under a concurrency cap.
///
/// Each call holds a permit from a shared admission gate for its whole
/// duration, including any pacing delay. A failing or panicking call only
/// fails its own record. No ordering is guaranteed between records, so
/// dependent entity groups must be seeded by separate, sequential calls.
///
/// Calls run as spawned tasks: if the future returned by `seed` is dropped,
/// calls already admitted still run to completion.
#[derive(Debug, Clone)]
pub struct SeedingEngine {
    concurrency_limit: usize,
    label_field: Option<String>,
    request_delay: Duration,
}

impl Default for SeedingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY_LIMIT)
    }
}

impl SeedingEngine {
    /// Create an engine. A limit of zero is treated as one.
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
            label_field: None,
            request_delay: Duration::ZERO,
        }
    }

    /// Field used to label records in logs and reports.
    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = Some(field.into());
        self
    }

    /// Pause after each call before releasing its permit.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Seed every record and report per-record outcomes.
    pub async fn seed(&self, entity: &str, records: &[Record], sink: Arc<dyn Sink>) -> SeedingReport {
        let started_at = Utc::now();
        let start = Instant::now();
        info!(
            "Seeding {} {} with concurrency {}",
            records.len(),
            entity,
            self.concurrency_limit
        );

        let results = self.run(entity, records, 0..records.len(), sink).await;
        self.finish(entity, results, started_at, start)
    }

    /// Seed the first record alone, then the rest.
    ///
    /// If the first call fails with a systemic error (refused credentials),
    /// nothing else is attempted and the failure is returned as an error.
    pub async fn seed_checked(
        &self,
        entity: &str,
        records: &[Record],
        sink: Arc<dyn Sink>,
    ) -> Result<SeedingReport, SeedingError> {
        if records.is_empty() {
            return Ok(self.seed(entity, records, sink).await);
        }

        let started_at = Utc::now();
        let start = Instant::now();
        info!(
            "Seeding {} {} with concurrency {} (first record alone)",
            records.len(),
            entity,
            self.concurrency_limit
        );

        let mut results = self.run(entity, records, 0..1, Arc::clone(&sink)).await;
        if let Some(refused) = results.iter().find(|r| r.systemic) {
            let detail = refused.detail.clone().unwrap_or_default();
            error!("First {} write failed systemically: {}", entity, detail);
            return Err(SeedingError::Systemic {
                entity: entity.to_string(),
                detail,
            });
        }

        results.extend(self.run(entity, records, 1..records.len(), sink).await);
        Ok(self.finish(entity, results, started_at, start))
    }

    fn finish(
        &self,
        entity: &str,
        results: Vec<SeedingResult>,
        started_at: chrono::DateTime<Utc>,
        start: Instant,
    ) -> SeedingReport {
        let report = SeedingReport::new(entity, results, started_at, start.elapsed());
        if report.failed == 0 {
            info!("{}", report.summary());
        } else {
            warn!("{}", report.summary());
        }
        report
    }

    fn label_for(&self, record: &Record, index: usize) -> String {
        self.label_field
            .as_deref()
            .and_then(|field| record.text(field))
            .unwrap_or_else(|| format!("#{index}"))
    }

    async fn run(
        &self,
        entity: &str,
        records: &[Record],
        range: Range<usize>,
        sink: Arc<dyn Sink>,
    ) -> Vec<SeedingResult> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut in_flight = FuturesUnordered::new();

        for index in range {
            let record = records[index].clone();
            let record_ref = RecordRef {
                index,
                label: self.label_for(&record, index),
            };
            let semaphore = Arc::clone(&semaphore);
            let sink = Arc::clone(&sink);
            let delay = self.request_delay;

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| SinkError::Other(format!("admission gate closed: {e}")))?;
                let result = sink.write(&record).await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            });
            in_flight.push(async move { (record_ref, handle.await) });
        }

        let mut results = Vec::with_capacity(in_flight.len());
        while let Some((record_ref, joined)) = in_flight.next().await {
            results.push(to_result(entity, record_ref, joined));
        }
        results
    }
}

fn to_result(
    entity: &str,
    record_ref: RecordRef,
    joined: Result<Result<SinkOutcome, SinkError>, tokio::task::JoinError>,
) -> SeedingResult {
    match joined {
        Ok(Ok(outcome)) => {
            debug!(
                "Seeded {} '{}' (id: {})",
                entity,
                record_ref.label,
                outcome.external_id.as_deref().unwrap_or("-")
            );
            SeedingResult::succeeded(record_ref, outcome.external_id)
        }
        Ok(Err(e)) => {
            error!("Failed to seed {} '{}': {}", entity, record_ref.label, e);
            let systemic = e.is_systemic();
            SeedingResult::failed(record_ref, e.to_string(), systemic)
        }
        Err(e) => {
            error!("Seeding task for {} '{}' failed: {}", entity, record_ref.label, e);
            SeedingResult::failed(record_ref, format!("seeding task failed: {e}"), false)
        }
    }
}
