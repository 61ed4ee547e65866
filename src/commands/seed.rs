//! Seeding handler.

use std::sync::Arc;

use anyhow::Context;
use record_store::StorageBackend;
use seed_populate::SeedingReport;

use crate::{EntityProfile, HttpJsonSink, SeedArgs};

/// Seed every stored record of a profile into its endpoint.
///
/// Individual record failures are reported but do not fail the command.
/// A refused credential on the first write, or every record failing, does.
pub async fn run(args: SeedArgs) -> anyhow::Result<SeedingReport> {
    let profile = EntityProfile::from_file(&args.profile)
        .with_context(|| format!("Failed to load profile {:?}", args.profile))?;
    let seeding = &profile.seeding;

    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| seeding.endpoint.clone())
        .context("No seeding endpoint. Set seeding.endpoint in the profile or pass --endpoint")?;

    let mut sink = HttpJsonSink::new(endpoint.clone(), args.timeout)?;
    if let Some(field) = &seeding.response_id_field {
        sink = sink.with_response_id_field(field.clone());
    }
    if let Some(var) = &seeding.token_env {
        let token = std::env::var(var)
            .with_context(|| format!("Environment variable {var} is not set"))?;
        sink = sink.with_bearer_token(token);
    }

    let store = profile.store();
    let mut records = store.load().await?;
    if records.is_empty() {
        tracing::warn!(
            "No {} records in {}; run generate first",
            profile.entity,
            store.path().display()
        );
    }

    tracing::info!("Seeding {} {} into {}", records.len(), profile.entity, endpoint);
    let engine = profile.seeding_engine(args.concurrency);
    let report = engine
        .seed_checked(&profile.entity, &records, Arc::new(sink))
        .await?;

    println!("{}", report.summary());
    for failure in report.failures() {
        println!(
            "  failed {}: {}",
            failure.record_ref.label,
            failure.detail.as_deref().unwrap_or("unknown error")
        );
    }

    if let Some(field) = &seeding.external_id_field {
        let tagged = report.apply_external_ids(&mut records, field);
        if tagged > 0 {
            store.flush(&records).await?;
            tracing::info!("Recorded {} external ids in field '{}'", tagged, field);
        }
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    if report.is_systemic_failure() {
        anyhow::bail!(
            "Every {} record failed to seed; check the endpoint and credentials",
            profile.entity
        );
    }
    Ok(report)
}
