//! Persistent record storage for demo-seed.
//!
//! Generated records are cached locally between runs so a later run can
//! resume toward its quota and skip identities that already exist.
//!
//! # Architecture
//!
//! - [`StorageBackend`] - the trait the generation driver writes through
//! - [`JsonFileStore`] - a JSON array file, rewritten in full on every flush
//! - [`MemoryStore`] - an in-process store for tests
//!
//! The driver never talks to a concrete backend, so an embedded database can
//! replace the JSON file without touching generation code.

mod filesystem;
mod memory;
pub mod store;

#[cfg(test)]
mod tests;

pub use filesystem::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{StorageBackend, StoreError};
