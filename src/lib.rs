//! demo-seed
//!
//! Generates collections of unique demo records with a text-completion model
//! and seeds them into business platforms.
//!
//! # Features
//!
//! - Quota generation: request batches until an exact number of unique
//!   records exists, resuming from what is already on disk
//! - Deduplication: normalized unique fields, including composite keys
//! - Backoff and circuit breaking around an overloaded provider
//! - Bounded concurrent seeding with per-record failure isolation
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate records until the profile's target count is reached
//! demo-seed generate --profile profiles/companies.yaml
//!
//! # Seed the stored records into the configured endpoint
//! demo-seed seed --profile profiles/companies.yaml --concurrency 8
//!
//! # Show stored count against target
//! demo-seed status --profile profiles/companies.yaml
//! ```

use std::path::PathBuf;

use clap::Args;

pub mod commands;
pub mod config;
pub mod profile;
pub mod sink;

pub use profile::{EntityProfile, ProfileError};
pub use sink::HttpJsonSink;

#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Entity profile (YAML)
    #[arg(long)]
    pub profile: PathBuf,

    /// Target record count, overriding the profile
    #[arg(long)]
    pub count: Option<usize>,

    /// Records requested per batch, overriding the profile
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// API key for the completion provider
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct SeedArgs {
    /// Entity profile (YAML)
    #[arg(long)]
    pub profile: PathBuf,

    /// Endpoint records are POSTed to, overriding the profile
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Maximum concurrent writes, overriding the profile
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout (e.g. "30s")
    #[arg(long, default_value = "30s", value_parser = config::parse_duration)]
    pub timeout: std::time::Duration,

    /// Write the seeding report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct StatusArgs {
    /// Entity profile (YAML)
    #[arg(long)]
    pub profile: PathBuf,
}
