//! CSV import handler.
//!
//! Source crate: crates/csv-source/ (part of supabase_sync::csv)
//! CLI command:
//! - Import: `csv --roles ... --users ... --tasks ...`

use postgrest_sink::{PostgrestOpts, PostgrestSink};
use supabase_sync::csv::ImportReport;
use supabase_sync::CsvArgs;

/// Run the CSV import against the configured Supabase project.
pub async fn run(args: &CsvArgs) -> anyhow::Result<ImportReport> {
    tracing::info!("Starting CSV import");
    tracing::info!("Target: {}", args.supabase.supabase_url);

    if args.supabase.dry_run {
        tracing::info!("Running in dry-run mode - no data will be written");
    }

    let sink = PostgrestSink::new(&PostgrestOpts::from(&args.supabase))?;
    tracing::debug!("REST base: {}", sink.base_url());

    let report = supabase_sync::csv::sync(&sink, &args.config()).await?;

    tracing::info!(
        "CSV import completed: {} succeeded, {} failed",
        report.total_success(),
        report.total_failed()
    );
    Ok(report)
}
