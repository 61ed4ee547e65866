//! Generation handler.

use std::sync::Arc;

use anyhow::Context;
use completion_adapter::AnthropicAdapter;
use quota_generator::{GenerationSummary, QuotaDriver};
use tokio_util::sync::CancellationToken;

use crate::{EntityProfile, GenerateArgs};

/// Generate records until the profile's quota is met.
///
/// Fails only when the run was aborted by a fatal adapter or storage error.
/// A run stopped by the circuit breaker keeps what it produced and succeeds.
pub async fn run(args: GenerateArgs) -> anyhow::Result<GenerationSummary> {
    let profile = EntityProfile::from_file(&args.profile)
        .with_context(|| format!("Failed to load profile {:?}", args.profile))?;

    let api_key = args
        .api_key
        .filter(|key| !key.trim().is_empty())
        .context("ANTHROPIC_API_KEY is required. Set it in the environment or pass --api-key")?;

    let adapter = AnthropicAdapter::new(
        profile.completion_config(api_key),
        profile.prompt_template()?,
    )?;
    let store = profile.store();
    tracing::info!(
        "Generating {} into {}",
        profile.entity,
        store.path().display()
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current batch");
            on_interrupt.cancel();
        }
    });

    let driver = QuotaDriver::new(
        Arc::new(adapter),
        Arc::new(store),
        profile.accumulator(),
        profile.driver_config(args.count, args.batch_size),
    )
    .with_cancellation(cancel);

    let generation = driver.run().await?;
    let summary = generation.summary;
    println!("{summary}");

    if let Some(error) = &summary.fatal_error {
        anyhow::bail!("{} generation aborted: {error}", summary.entity);
    }
    if !summary.is_complete() {
        tracing::warn!(
            "{} generation stopped short of target: {}/{}",
            summary.entity,
            summary.achieved,
            summary.requested
        );
    }
    Ok(summary)
}
