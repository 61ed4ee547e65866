//! Command-line interface for demo-seed
//!
//! # Usage Examples
//!
//! ## Generation
//! ```bash
//! # Generate up to the profile's target count
//! ANTHROPIC_API_KEY=... demo-seed generate --profile profiles/contacts.yaml
//!
//! # Override the target and batch size
//! demo-seed generate --profile profiles/contacts.yaml --count 200 --batch-size 20
//! ```
//!
//! ## Seeding
//! ```bash
//! demo-seed seed --profile profiles/contacts.yaml \
//!   --endpoint http://localhost:8069/api/contacts \
//!   --concurrency 8 --report contacts-report.json
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=info`.

use clap::{Parser, Subcommand};
use demo_seed::{commands, GenerateArgs, SeedArgs, StatusArgs};

#[derive(Parser)]
#[command(name = "demo-seed")]
#[command(about = "Generate unique demo records with a text model and seed them into business platforms")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate records until the profile's target count of unique records exists
    Generate(GenerateArgs),

    /// Seed stored records into the profile's endpoint
    Seed(SeedArgs),

    /// Show stored record count against the target
    Status(StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            commands::generate(args).await?;
        }
        Commands::Seed(args) => {
            commands::seed(args).await?;
        }
        Commands::Status(args) => {
            commands::status(args).await?;
        }
    }
    Ok(())
}
