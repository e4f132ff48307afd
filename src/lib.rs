//! SupabaseSync Library
//!
//! Imports role, user and task exports into a Supabase project through its
//! PostgREST interface.
//!
//! # Pipeline
//!
//! - Source rows: delimiter-sniffed CSV from a local path or HTTP/HTTPS URL
//! - Normalization: per-table coercion into typed records, bad rows skipped
//! - Dependencies: roles that users reference are created when missing
//! - Upsert: batched bulk creates, falling back to per-record updates on
//!   primary-key conflicts
//!
//! # CLI Usage
//!
//! ```bash
//! # Import all three tables
//! supabase-sync csv --roles roles_rows.csv --users users_rows.csv --tasks tasks_rows.csv
//!
//! # Users only, against a hosted project, without writing anything
//! SUPABASE_URL=https://abc.supabase.co SUPABASE_ANON_KEY=... \
//!   supabase-sync csv --users https://example.com/users_rows.csv --dry-run
//! ```

use clap::Parser;
use postgrest_sink::PostgrestOpts;
use supabase_sync_csv_source::{FileSource, DEFAULT_BATCH_SIZE};

// Re-export the CSV pipeline crate for convenience
pub use supabase_sync_csv_source as csv;

#[derive(Parser, Clone, Debug)]
pub struct RestOpts {
    /// Supabase project URL
    #[arg(long, default_value = "http://localhost:54321", env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Supabase API key (sent as `apikey` and bearer token)
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: String,

    /// Number of records per bulk create
    #[arg(
        long,
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub batch_size: usize,

    /// Dry run mode - read and normalize, but don't write data
    #[arg(long)]
    pub dry_run: bool,
}

impl From<&RestOpts> for PostgrestOpts {
    fn from(opts: &RestOpts) -> Self {
        Self {
            supabase_url: opts.supabase_url.clone(),
            supabase_key: opts.supabase_key.clone(),
        }
    }
}

/// Arguments of the `csv` import command
#[derive(Parser, Clone, Debug)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .multiple(true)
        .args(["roles", "users", "tasks"])
))]
pub struct CsvArgs {
    /// Role rows: local path or HTTP/HTTPS URL
    #[arg(long, value_name = "SOURCE")]
    pub roles: Option<FileSource>,

    /// User rows: local path or HTTP/HTTPS URL
    #[arg(long, value_name = "SOURCE")]
    pub users: Option<FileSource>,

    /// Task rows: local path or HTTP/HTTPS URL
    #[arg(long, value_name = "SOURCE")]
    pub tasks: Option<FileSource>,

    /// Exit non-zero when records were submitted but none succeeded
    #[arg(long)]
    pub strict_exit: bool,

    /// Target Supabase options
    #[command(flatten)]
    pub supabase: RestOpts,
}

impl CsvArgs {
    /// Pipeline configuration for these arguments.
    pub fn config(&self) -> csv::Config {
        csv::Config {
            roles: self.roles.clone(),
            users: self.users.clone(),
            tasks: self.tasks.clone(),
            batch_size: self.supabase.batch_size,
            dry_run: self.supabase.dry_run,
        }
    }
}

/// Whether a finished import should fail the process.
///
/// Only applies with `strict`: records were submitted and none succeeded.
pub fn import_failed(report: &csv::ImportReport, strict: bool) -> bool {
    strict && report.total_success() == 0 && report.total_submitted() > 0
}
