//! Bounded concurrent seeding of records into a target platform.
//!
//! [`SeedingEngine`] writes each record through a [`Sink`] with at most a
//! fixed number of calls in flight, isolates failures per record, and
//! returns a [`SeedingReport`] with one result per input record.

pub mod engine;
pub mod report;
pub mod sink;

pub use engine::{SeedingEngine, SeedingError, DEFAULT_CONCURRENCY_LIMIT};
pub use report::{RecordRef, SeedStatus, SeedingReport, SeedingResult};
pub use sink::{Sink, SinkError, SinkOutcome};
