//! Core types for the demo-seed generation engine.
//!
//! This crate holds the pieces of the engine that never touch I/O:
//!
//! - [`Record`] - one generated domain entity, an ordered field map
//! - [`Normalizer`] and [`UniqueFieldSpec`] - how a field's value is reduced
//!   to the identity that must stay unique
//! - [`IdentityTracker`] - the per-field sets of already claimed identities
//! - [`Accumulator`] - filters one candidate batch into accepted, duplicate
//!   and invalid records
//!
//! Everything here is single-threaded by construction. The generation phase
//! owns one tracker and mutates it in place between batches.

pub mod accumulator;
pub mod identity;
pub mod normalize;
pub mod record;

pub use accumulator::{Accumulator, BatchOutcome, RejectReason, Rejection};
pub use identity::{IdentitySet, IdentityTracker};
pub use normalize::{Normalizer, UniqueFieldSpec, PHONE_DIGITS_KEPT};
pub use record::Record;
