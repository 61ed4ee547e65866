//! Quota-driven batch generation for demo-seed.
//!
//! The [`QuotaDriver`] asks a [`BatchAdapter`] for candidate records in
//! batches, filters each batch through a deduplicating accumulator, and
//! persists the growing collection after every batch until an exact target
//! count of unique records exists.
//!
//! # Example
//!
//! ```ignore
//! use quota_generator::{DriverConfig, QuotaDriver};
//! use record_store::JsonFileStore;
//! use seed_core::{Accumulator, Normalizer, UniqueFieldSpec};
//!
//! let accumulator = Accumulator::new(
//!     vec!["email".into()],
//!     vec![UniqueFieldSpec::new("email", Normalizer::Lowercase)],
//! );
//! let driver = QuotaDriver::new(
//!     adapter,
//!     Arc::new(JsonFileStore::new("data/contacts.json")),
//!     accumulator,
//!     DriverConfig::new("contacts", 100, 10),
//! );
//! let run = driver.run().await?;
//! println!("{}", run.summary);
//! ```

pub mod adapter;
pub mod driver;
pub mod retry;
pub mod summary;

pub use adapter::{AdapterError, BatchAdapter, BatchRequest, ExclusionContext, FieldExclusions};
pub use driver::{
    DriverConfig, DriverError, QuotaDriver, DEFAULT_CIRCUIT_BREAKER_THRESHOLD,
    DEFAULT_EXCLUSION_SAMPLE_SIZE,
};
pub use retry::RetryPolicy;
pub use summary::{DriverState, GenerationRun, GenerationSummary};
