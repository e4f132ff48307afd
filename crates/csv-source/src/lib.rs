//! CSV import pipeline
//!
//! Reads role, user and task rows from delimited text sources, normalizes
//! them into typed records, creates any roles users reference but the store
//! lacks, and writes everything through a [`RestSink`] in batches.

mod normalize;
mod reader;
mod report;
mod resolver;
mod sync;

pub use normalize::{normalize_role, normalize_task, normalize_user, NormalizeContext};
pub use reader::{read_rows, read_source, sniff_delimiter, strip_bom};
pub use report::{ImportReport, TableReport};
pub use resolver::{ensure_roles_exist, referenced_roles, ResolveOutcome};
pub use sync::{sync, Config};

// Re-export the sink abstraction for callers that only depend on this crate
pub use rest_sink::{upsert_records, BatchCounts, RestSink, DEFAULT_BATCH_SIZE};

// Re-export file source types for convenience
pub use supabase_sync_file::FileSource;
