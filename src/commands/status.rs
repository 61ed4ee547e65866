//! Status handler.

use anyhow::Context;
use record_store::StorageBackend;

use crate::{EntityProfile, StatusArgs};

/// Stored record count against the profile's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStatus {
    pub entity: String,
    pub stored: usize,
    pub target: usize,
    /// Records tagged with an identifier from a previous seeding run.
    pub seeded: Option<usize>,
}

impl EntityStatus {
    pub fn remaining(&self) -> usize {
        self.target.saturating_sub(self.stored)
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}/{} records ({} remaining)",
            self.entity,
            self.stored,
            self.target,
            self.remaining()
        )?;
        if let Some(seeded) = self.seeded {
            write!(f, ", {seeded} seeded")?;
        }
        Ok(())
    }
}

pub async fn run(args: StatusArgs) -> anyhow::Result<EntityStatus> {
    let profile = EntityProfile::from_file(&args.profile)
        .with_context(|| format!("Failed to load profile {:?}", args.profile))?;
    let records = profile.store().load().await?;

    let seeded = profile
        .seeding
        .external_id_field
        .as_deref()
        .map(|field| records.iter().filter(|r| r.has_value(field)).count());

    let status = EntityStatus {
        entity: profile.entity.clone(),
        stored: records.len(),
        target: profile.target_count,
        seeded,
    };
    println!("{status}");
    Ok(status)
}
