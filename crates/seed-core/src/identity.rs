//! Claimed identity tracking.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::normalize::UniqueFieldSpec;
use crate::record::Record;

/// Normalized values already claimed for one unique field.
///
/// Claim order is kept so callers can show the model the most recent
/// identities it should avoid.
#[derive(Debug, Clone, Default)]
pub struct IdentitySet {
    claimed: HashSet<String>,
    order: Vec<String>,
}

impl IdentitySet {
    pub fn contains(&self, value: &str) -> bool {
        self.claimed.contains(value)
    }

    /// Claim a value. Returns false if it was already claimed.
    pub fn insert(&mut self, value: String) -> bool {
        if self.claimed.contains(&value) {
            return false;
        }
        self.claimed.insert(value.clone());
        self.order.push(value);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The last `limit` claimed values, oldest first.
    pub fn recent(&self, limit: usize) -> &[String] {
        let start = self.order.len().saturating_sub(limit);
        &self.order[start..]
    }
}

/// Per-field sets of claimed identities.
///
/// Claims are never released: once a value is taken by a persisted or
/// accepted record it stays taken for the life of the tracker, whatever
/// happens to the record later.
#[derive(Debug, Clone)]
pub struct IdentityTracker {
    specs: Vec<UniqueFieldSpec>,
    sets: HashMap<String, IdentitySet>,
}

impl IdentityTracker {
    pub fn new(specs: Vec<UniqueFieldSpec>) -> Self {
        let sets = specs
            .iter()
            .map(|spec| (spec.name.clone(), IdentitySet::default()))
            .collect();
        Self { specs, sets }
    }

    pub fn specs(&self) -> &[UniqueFieldSpec] {
        &self.specs
    }

    fn spec(&self, field: &str) -> Option<&UniqueFieldSpec> {
        self.specs.iter().find(|spec| spec.name == field)
    }

    /// Normalize a raw value with the rule configured for `field`.
    ///
    /// Unknown fields and values that normalize to nothing yield `None`.
    pub fn normalize(&self, field: &str, raw: &str) -> Option<String> {
        self.spec(field)?.normalizer.apply(raw)
    }

    pub fn is_claimed(&self, field: &str, value: &str) -> bool {
        self.sets
            .get(field)
            .map(|set| set.contains(value))
            .unwrap_or(false)
    }

    /// Claim a normalized value. Claiming twice is a no-op.
    ///
    /// Returns true if the value was newly claimed.
    pub fn claim(&mut self, field: &str, value: impl Into<String>) -> bool {
        self.sets
            .entry(field.to_string())
            .or_default()
            .insert(value.into())
    }

    /// Claim every identity found in previously persisted records.
    ///
    /// Persisted records that collide with each other are not an error here;
    /// the shared identity is simply claimed once.
    pub fn bulk_load(&mut self, records: &[Record]) -> usize {
        let mut claimed = 0;
        for record in records {
            for index in 0..self.specs.len() {
                let Some(value) = self.specs[index].identity_of(record) else {
                    continue;
                };
                let field = self.specs[index].name.clone();
                if self.claim(&field, value) {
                    claimed += 1;
                }
            }
        }
        debug!(
            "Loaded {} claimed identities from {} existing records",
            claimed,
            records.len()
        );
        claimed
    }

    /// Number of claimed values for a field.
    pub fn claimed_count(&self, field: &str) -> usize {
        self.sets.get(field).map(IdentitySet::len).unwrap_or(0)
    }

    /// The most recent claimed values for a field, oldest first.
    pub fn recent(&self, field: &str, limit: usize) -> &[String] {
        self.sets
            .get(field)
            .map(|set| set.recent(limit))
            .unwrap_or(&[])
    }
}
