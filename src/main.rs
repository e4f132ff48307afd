//! Command-line interface for supabase-sync
//!
//! # Usage Examples
//!
//! ```bash
//! # Import roles, then users, then tasks into a local Supabase stack
//! export SUPABASE_ANON_KEY=...
//! supabase-sync csv \
//!   --roles roles_rows.csv \
//!   --users users_rows.csv \
//!   --tasks tasks_rows.csv
//!
//! # Hosted project, larger batches, fail the process if nothing was imported
//! supabase-sync csv \
//!   --supabase-url https://abc.supabase.co \
//!   --users https://example.com/exports/users_rows.csv \
//!   --batch-size 50 \
//!   --strict-exit
//! ```
//!
//! Logging honours `RUST_LOG` and defaults to `info`.

use clap::{Parser, Subcommand};
use supabase_sync::{import_failed, CsvArgs};
use tracing_subscriber::EnvFilter;

mod from;

#[derive(Parser)]
#[command(name = "supabase-sync")]
#[command(about = "A tool for importing role, user and task CSV exports into Supabase")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import role, user and task CSV files into Supabase
    Csv(CsvArgs),
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
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Csv(args) => {
            let report = from::csv::run(&args).await?;
            if import_failed(&report, args.strict_exit) {
                anyhow::bail!(
                    "No records were imported ({} failed)",
                    report.total_failed()
                );
            }
        }
    }

    Ok(())
}
