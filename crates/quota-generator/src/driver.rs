//! Quota-batch generation driver.

use std::sync::Arc;
use std::time::Duration;

use record_store::{StorageBackend, StoreError};
use seed_core::{Accumulator, Record};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::adapter::{AdapterError, BatchAdapter, BatchRequest, ExclusionContext};
use crate::retry::RetryPolicy;
use crate::summary::{DriverState, GenerationRun, GenerationSummary};

/// Consecutive failed batches that abort a run.
pub const DEFAULT_CIRCUIT_BREAKER_THRESHOLD: u32 = 3;
/// Recent identities per field shown to the adapter.
pub const DEFAULT_EXCLUSION_SAMPLE_SIZE: usize = 40;

/// Errors that stop a run before it starts.
///
/// Failures during the run end it as `Aborted` instead; see
/// [`GenerationSummary::fatal_error`].
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Failed to load existing records: {0}")]
    Load(#[from] StoreError),
}

/// Driver settings for one entity.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Entity name used in log lines.
    pub entity: String,
    pub target_count: usize,
    /// Requested candidates per batch. Zero is treated as one.
    pub batch_size: usize,
    pub circuit_breaker_threshold: u32,
    /// Halve the batch size after each failed batch, down to one.
    pub shrink_on_failure: bool,
    pub exclusion_sample_size: usize,
    /// Pause after each persisted batch when more are needed.
    pub batch_pause: Duration,
    pub retry: RetryPolicy,
}

impl DriverConfig {
    pub fn new(entity: impl Into<String>, target_count: usize, batch_size: usize) -> Self {
        Self {
            entity: entity.into(),
            target_count,
            batch_size,
            circuit_breaker_threshold: DEFAULT_CIRCUIT_BREAKER_THRESHOLD,
            shrink_on_failure: true,
            exclusion_sample_size: DEFAULT_EXCLUSION_SAMPLE_SIZE,
            batch_pause: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Mutable loop state of a run.
struct Progress {
    batch_number: u64,
    request_size: usize,
    working_batch_size: usize,
    consecutive_failures: u32,
    /// Accepted records not yet flushed.
    dirty: bool,
}

/// Repeatedly requests, deduplicates and persists batches until the target
/// count is reached or the circuit breaker trips.
///
/// Only one adapter call is in flight at a time: every request carries an
/// exclusion context built from all batches before it.
pub struct QuotaDriver {
    adapter: Arc<dyn BatchAdapter>,
    store: Arc<dyn StorageBackend>,
    accumulator: Accumulator,
    config: DriverConfig,
    cancel: CancellationToken,
}

impl QuotaDriver {
    pub fn new(
        adapter: Arc<dyn BatchAdapter>,
        store: Arc<dyn StorageBackend>,
        accumulator: Accumulator,
        config: DriverConfig,
    ) -> Self {
        Self {
            adapter,
            store,
            accumulator,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the run at the next batch boundary once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run to a terminal state.
    ///
    /// Returns every held record (existing plus new) and the run summary.
    /// Callers compare `summary.achieved` with the target to detect a
    /// partial run.
    pub async fn run(mut self) -> Result<GenerationRun, DriverError> {
        let mut records = self.store.load().await?;
        self.accumulator.tracker_mut().bulk_load(&records);

        let target = self.config.target_count;
        let configured_batch_size = self.config.batch_size.max(1);
        let threshold = self.config.circuit_breaker_threshold.max(1);
        let mut summary = GenerationSummary::new(&self.config.entity, target, records.len());

        info!(
            "Starting {} generation - target: {}, existing: {}, batch size: {}, store: {}",
            self.config.entity,
            target,
            records.len(),
            configured_batch_size,
            self.store.describe()
        );

        let mut progress = Progress {
            batch_number: 0,
            request_size: 0,
            working_batch_size: configured_batch_size,
            consecutive_failures: 0,
            dirty: false,
        };
        let mut candidates: Vec<Record> = Vec::new();
        let mut state = DriverState::Sizing;

        loop {
            debug!("{} driver state: {}", self.config.entity, state);
            state = match state {
                DriverState::Sizing => {
                    let remaining = target.saturating_sub(records.len());
                    if remaining == 0 {
                        DriverState::Done
                    } else if self.cancel.is_cancelled() {
                        info!(
                            "{} generation cancelled with {} of {} records",
                            self.config.entity,
                            records.len(),
                            target
                        );
                        DriverState::Cancelled
                    } else {
                        progress.batch_number += 1;
                        progress.request_size = progress.working_batch_size.min(remaining);
                        DriverState::Requesting
                    }
                }

                DriverState::Requesting => {
                    match self
                        .request_batch(&progress, records.len(), &mut summary)
                        .await
                    {
                        Ok(batch) => {
                            candidates = batch;
                            DriverState::Accumulating
                        }
                        Err(e) if e.is_transient() => {
                            self.failed_batch(&mut progress, &mut summary, threshold)
                        }
                        Err(e) => {
                            error!(
                                "Batch {} failed with a fatal error: {}",
                                progress.batch_number, e
                            );
                            summary.fatal_error = Some(e.to_string());
                            DriverState::Aborted
                        }
                    }
                }

                DriverState::Accumulating => {
                    let remaining = target.saturating_sub(records.len());
                    let outcome = self
                        .accumulator
                        .accumulate(std::mem::take(&mut candidates), remaining);
                    summary.duplicates_skipped += outcome.duplicates.len();
                    summary.invalid_skipped += outcome.invalid.len();

                    if outcome.accepted.is_empty() {
                        warn!(
                            "No unique {} generated in batch {}",
                            self.config.entity, progress.batch_number
                        );
                        self.failed_batch(&mut progress, &mut summary, threshold)
                    } else {
                        progress.consecutive_failures = 0;
                        progress.working_batch_size = configured_batch_size;
                        progress.dirty = true;
                        records.extend(outcome.accepted);
                        info!(
                            "Batch {} complete - progress: {}/{}",
                            progress.batch_number,
                            records.len(),
                            target
                        );
                        DriverState::Persisting
                    }
                }

                DriverState::Persisting => match self.store.flush(&records).await {
                    Ok(()) => {
                        progress.dirty = false;
                        if records.len() < target && !self.config.batch_pause.is_zero() {
                            tokio::time::sleep(self.config.batch_pause).await;
                        }
                        DriverState::Sizing
                    }
                    Err(e) => {
                        error!("Failed to persist {}: {}", self.config.entity, e);
                        summary.fatal_error = Some(format!("Failed to persist records: {e}"));
                        DriverState::Aborted
                    }
                },

                DriverState::Done | DriverState::Aborted | DriverState::Cancelled => break,
            };
        }

        if progress.dirty {
            match self.store.flush(&records).await {
                Ok(()) => info!(
                    "Saved {} {} before stopping",
                    records.len(),
                    self.config.entity
                ),
                Err(e) => error!(
                    "Failed to save {} {} before stopping: {}",
                    records.len(),
                    self.config.entity,
                    e
                ),
            }
        }

        summary.achieved = records.len();
        summary.state = state;
        if summary.is_complete() {
            info!("{}", summary);
        } else {
            warn!("{}", summary);
        }

        Ok(GenerationRun { records, summary })
    }

    /// Call the adapter, retrying transient failures per the retry policy.
    async fn request_batch(
        &self,
        progress: &Progress,
        existing_count: usize,
        summary: &mut GenerationSummary,
    ) -> Result<Vec<Record>, AdapterError> {
        let policy = &self.config.retry;
        let mut attempt = 1;

        loop {
            let request = BatchRequest {
                batch_size: progress.request_size,
                batch_number: progress.batch_number,
                attempt,
                exclusions: ExclusionContext::from_tracker(
                    self.accumulator.tracker(),
                    existing_count,
                    self.config.exclusion_sample_size,
                ),
            };
            info!(
                "Processing batch {} - requesting {} {} (attempt {})",
                progress.batch_number, progress.request_size, self.config.entity, attempt
            );

            summary.adapter_calls += 1;
            match self.adapter.generate(&request).await {
                Ok(batch) => {
                    debug!(
                        "Batch {} returned {} candidates",
                        progress.batch_number,
                        batch.len()
                    );
                    return Ok(batch);
                }
                Err(e) if policy.should_retry(&e, attempt) => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        "Batch {} attempt {}/{} failed: {}. Retrying in {:?}...",
                        progress.batch_number, attempt, policy.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(AdapterError::Unparseable(detail)) => {
                    return Err(AdapterError::Fatal(format!(
                        "Unparseable response after {attempt} attempts: {detail}"
                    )));
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!(
                            "Batch {} failed after {} attempts: {}",
                            progress.batch_number, attempt, e
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Count a wasted batch and decide whether to keep going.
    fn failed_batch(
        &self,
        progress: &mut Progress,
        summary: &mut GenerationSummary,
        threshold: u32,
    ) -> DriverState {
        summary.failed_batches += 1;
        progress.consecutive_failures += 1;

        if progress.consecutive_failures >= threshold {
            error!(
                "Too many consecutive failures ({}). Stopping {} generation.",
                progress.consecutive_failures, self.config.entity
            );
            return DriverState::Aborted;
        }

        if self.config.shrink_on_failure {
            progress.working_batch_size = (progress.working_batch_size / 2).max(1);
            debug!(
                "Batch size reduced to {} after failure",
                progress.working_batch_size
            );
        }
        DriverState::Sizing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use record_store::MemoryStore;
    use seed_core::{Normalizer, UniqueFieldSpec};
    use serde_json::json;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    fn contact(email: &str) -> Record {
        Record::from_value(json!({"email": email, "name": format!("Contact {email}")})).unwrap()
    }

    fn email_accumulator() -> Accumulator {
        Accumulator::new(
            vec!["email".to_string()],
            vec![UniqueFieldSpec::new("email", Normalizer::Lowercase)],
        )
    }

    fn config(target: usize, batch: usize) -> DriverConfig {
        DriverConfig::new("contacts", target, batch).with_retry(RetryPolicy::immediate(2))
    }

    /// Adapter that replays scripted responses and records every request.
    #[derive(Default)]
    struct ScriptedAdapter {
        responses: Mutex<VecDeque<Result<Vec<Record>, AdapterError>>>,
        requests: Mutex<Vec<BatchRequest>>,
    }

    impl ScriptedAdapter {
        fn new(responses: Vec<Result<Vec<Record>, AdapterError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<BatchRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BatchAdapter for ScriptedAdapter {
        async fn generate(&self, request: &BatchRequest) -> Result<Vec<Record>, AdapterError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AdapterError::Fatal("script exhausted".into())))
        }
    }

    /// Adapter that always returns `batch_size + extra` fresh emails.
    #[derive(Default)]
    struct OverDeliveringAdapter {
        extra: usize,
        counter: Mutex<usize>,
    }

    #[async_trait]
    impl BatchAdapter for OverDeliveringAdapter {
        async fn generate(&self, request: &BatchRequest) -> Result<Vec<Record>, AdapterError> {
            let mut counter = self.counter.lock().unwrap();
            let batch = (0..request.batch_size + self.extra)
                .map(|_| {
                    *counter += 1;
                    contact(&format!("user{}@x.io", *counter))
                })
                .collect();
            Ok(batch)
        }
    }

    #[tokio::test]
    async fn test_reaches_quota_across_batches() {
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec![contact("a@x.io"), contact("b@x.io"), contact("A@X.io")]),
            Ok(vec![contact("d@x.io"), contact("e@x.io")]),
            Ok(vec![contact("f@x.io")]),
        ]);
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter.clone(), store.clone(), email_accumulator(), config(5, 3))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Done);
        assert_eq!(run.records.len(), 5);
        assert_eq!(run.summary.duplicates_skipped, 1);
        assert_eq!(store.flush_count(), 3);
        assert_eq!(store.records().len(), 5);

        let sizes: Vec<usize> = adapter.requests().iter().map(|r| r.batch_size).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_over_delivery_never_exceeds_target() {
        let adapter = Arc::new(OverDeliveringAdapter {
            extra: 5,
            ..Default::default()
        });
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter, store.clone(), email_accumulator(), config(10, 4))
            .run()
            .await
            .unwrap();

        assert_eq!(run.records.len(), 10);
        assert_eq!(store.records().len(), 10);
        assert!(run.summary.is_complete());
        assert!(run.summary.duplicates_skipped > 0);
    }

    #[tokio::test]
    async fn test_existing_quota_makes_no_adapter_calls() {
        let existing: Vec<Record> = (0..4).map(|i| contact(&format!("old{i}@x.io"))).collect();
        let adapter = ScriptedAdapter::new(vec![]);
        let store = Arc::new(MemoryStore::with_records(existing.clone()));

        let run = QuotaDriver::new(adapter.clone(), store.clone(), email_accumulator(), config(4, 2))
            .run()
            .await
            .unwrap();

        assert!(adapter.requests().is_empty());
        assert_eq!(run.records, existing);
        assert_eq!(run.summary.state, DriverState::Done);
        assert_eq!(run.summary.new_records(), 0);
        assert_eq!(store.flush_count(), 0);
    }

    #[tokio::test]
    async fn test_history_identities_are_excluded_and_rejected() {
        let store = Arc::new(MemoryStore::with_records(vec![contact("old@x.io")]));
        let adapter = ScriptedAdapter::new(vec![Ok(vec![contact("OLD@x.io"), contact("new@x.io")])]);

        let run = QuotaDriver::new(adapter.clone(), store, email_accumulator(), config(2, 5))
            .run()
            .await
            .unwrap();

        assert_eq!(run.records.len(), 2);
        assert_eq!(run.summary.duplicates_skipped, 1);

        let requests = adapter.requests();
        assert_eq!(requests[0].batch_size, 1);
        assert_eq!(requests[0].exclusions.existing_count, 1);
        assert_eq!(requests[0].exclusions.fields[0].values, vec!["old@x.io"]);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried_within_a_batch() {
        let adapter = ScriptedAdapter::new(vec![
            Err(AdapterError::Transient("overloaded".into())),
            Ok(vec![contact("a@x.io")]),
        ]);
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter.clone(), store, email_accumulator(), config(1, 1))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Done);
        assert_eq!(run.summary.failed_batches, 0);
        assert_eq!(run.summary.adapter_calls, 2);
        let attempts: Vec<u32> = adapter.requests().iter().map(|r| r.attempt).collect();
        assert_eq!(attempts, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_circuit_breaker_aborts_after_consecutive_failures() {
        let responses = (0..20)
            .map(|_| Err(AdapterError::Transient("rate limited".into())))
            .collect();
        let adapter = ScriptedAdapter::new(responses);
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter.clone(), store, email_accumulator(), config(10, 8))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Aborted);
        assert_eq!(run.summary.failed_batches, 3);
        assert!(run.summary.achieved < run.summary.requested);
        assert!(!run.summary.is_fatal());
        // 3 batches x 2 attempts each
        assert_eq!(run.summary.adapter_calls, 6);

        let sizes: Vec<usize> = adapter.requests().iter().map(|r| r.batch_size).collect();
        assert_eq!(sizes, vec![8, 8, 4, 4, 2, 2]);
    }

    #[tokio::test]
    async fn test_batches_without_unique_records_count_as_failures() {
        let store = Arc::new(MemoryStore::with_records(vec![contact("dup@x.io")]));
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec![contact("dup@x.io")]),
            Ok(vec![]),
            Ok(vec![Record::from_value(json!({"name": "no email"})).unwrap()]),
        ]);

        let mut cfg = config(5, 2);
        cfg.shrink_on_failure = false;
        let run = QuotaDriver::new(adapter.clone(), store, email_accumulator(), cfg)
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Aborted);
        assert_eq!(run.summary.failed_batches, 3);
        assert_eq!(run.summary.duplicates_skipped, 1);
        assert_eq!(run.summary.invalid_skipped, 1);
        let sizes: Vec<usize> = adapter.requests().iter().map(|r| r.batch_size).collect();
        assert_eq!(sizes, vec![2, 2, 2]);
    }

    #[tokio::test]
    async fn test_success_resets_failure_counter() {
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![contact("a@x.io")]),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![contact("b@x.io")]),
        ]);
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter, store, email_accumulator(), config(2, 4))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Done);
        assert_eq!(run.summary.failed_batches, 4);
        assert_eq!(run.records.len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_keeps_partial_progress() {
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec![contact("a@x.io"), contact("b@x.io")]),
            Err(AdapterError::Fatal("invalid api key".into())),
        ]);
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter.clone(), store.clone(), email_accumulator(), config(5, 2))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Aborted);
        assert!(run.summary.is_fatal());
        assert_eq!(run.summary.achieved, 2);
        assert_eq!(store.records().len(), 2);
        // fatal errors are not retried
        assert_eq!(adapter.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_flush_failure_aborts_run() {
        let adapter = ScriptedAdapter::new(vec![Ok(vec![contact("a@x.io")])]);
        let store = Arc::new(MemoryStore::new());
        store.fail_flushes(true);

        let run = QuotaDriver::new(adapter, store.clone(), email_accumulator(), config(3, 1))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Aborted);
        assert!(run.summary.is_fatal());
        assert_eq!(run.records.len(), 1);
        assert_eq!(store.flush_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_flush_is_saved_when_stopping() {
        let adapter = ScriptedAdapter::new(vec![Ok(vec![contact("a@x.io"), contact("b@x.io")])]);
        let store = Arc::new(MemoryStore::new());
        store.fail_next_flushes(1);

        let run = QuotaDriver::new(adapter, store.clone(), email_accumulator(), config(5, 2))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Aborted);
        assert!(run.summary.is_fatal());
        assert_eq!(store.flush_count(), 1);
        let stored: Vec<String> = store
            .records()
            .iter()
            .filter_map(|r| r.text("email"))
            .collect();
        assert_eq!(stored, vec!["a@x.io", "b@x.io"]);
    }

    #[tokio::test]
    async fn test_unparseable_response_is_fatal_once_attempts_run_out() {
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec![contact("a@x.io")]),
            Err(AdapterError::Unparseable("no JSON array".into())),
            Err(AdapterError::Unparseable("no JSON array".into())),
            Ok(vec![contact("b@x.io")]),
        ]);
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter.clone(), store.clone(), email_accumulator(), config(5, 3))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Aborted);
        assert_eq!(run.summary.failed_batches, 0);
        let error = run.summary.fatal_error.as_deref().unwrap();
        assert!(error.contains("Unparseable response after 2 attempts"));
        // retried once within the batch, then no further batches
        assert_eq!(adapter.requests().len(), 3);
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_response_recovers_within_attempts() {
        let adapter = ScriptedAdapter::new(vec![
            Err(AdapterError::Unparseable("truncated".into())),
            Ok(vec![contact("a@x.io")]),
        ]);
        let store = Arc::new(MemoryStore::new());

        let run = QuotaDriver::new(adapter, store, email_accumulator(), config(1, 1))
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Done);
        assert!(!run.summary.is_fatal());
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_first_batch() {
        let adapter = ScriptedAdapter::new(vec![Ok(vec![contact("a@x.io")])]);
        let store = Arc::new(MemoryStore::new());
        let token = CancellationToken::new();
        token.cancel();

        let run = QuotaDriver::new(adapter.clone(), store, email_accumulator(), config(3, 1))
            .with_cancellation(token)
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Cancelled);
        assert!(adapter.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_between_attempts() {
        let adapter = ScriptedAdapter::new(vec![
            Err(AdapterError::Transient("overloaded".into())),
            Err(AdapterError::Transient("overloaded".into())),
            Ok(vec![contact("a@x.io")]),
        ]);
        let store = Arc::new(MemoryStore::new());
        let cfg = DriverConfig::new("contacts", 1, 1).with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            retry_if: AdapterError::is_transient,
        });

        let started = tokio::time::Instant::now();
        let run = QuotaDriver::new(adapter, store, email_accumulator(), cfg)
            .run()
            .await
            .unwrap();

        assert_eq!(run.summary.state, DriverState::Done);
        assert!(started.elapsed() >= Duration::from_secs(12));
    }

    #[tokio::test]
    async fn test_persisted_collection_has_unique_emails() {
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec![contact("a@x.io"), contact("b@x.io"), contact("a@x.io"), contact("c@x.io")]),
            Ok(vec![contact("C@x.io"), contact("d@x.io"), contact("b@x.io"), contact("e@x.io")]),
            Ok(vec![contact("e@x.io"), contact("f@x.io"), contact("a@x.io"), contact("g@x.io")]),
        ]);
        let store = Arc::new(MemoryStore::new());

        QuotaDriver::new(adapter, store.clone(), email_accumulator(), config(7, 4))
            .run()
            .await
            .unwrap();

        let stored = store.records();
        let emails: HashSet<String> = stored
            .iter()
            .filter_map(|r| r.text("email").map(|e| e.to_lowercase()))
            .collect();
        assert_eq!(emails.len(), stored.len());
        assert_eq!(stored.len(), 7);
    }
}
