//! Batch upsert client.
//!
//! Records are sent in fixed-size batches, strictly one after another. A
//! batch that conflicts on a primary key degrades to one update per record
//! in that batch, and a record the update finds missing is inserted on its
//! own. Any other failure counts the whole batch as failed and the next
//! batch proceeds. Nothing is retried.

use crate::traits::{CreateResponse, RestSink, UpdateResponse};
use serde_json::Value;
use sync_core::{Record, RecordId};
use tracing::{debug, info, warn};

/// Default number of records per bulk create.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Longest slice of a rejected response body that gets logged.
const LOGGED_BODY_LEN: usize = 200;

/// Success and failure counts for one or more batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub success: usize,
    pub failed: usize,
}

impl BatchCounts {
    pub fn new(success: usize, failed: usize) -> Self {
        Self { success, failed }
    }
}

impl std::ops::AddAssign for BatchCounts {
    fn add_assign(&mut self, other: Self) {
        self.success += other.success;
        self.failed += other.failed;
    }
}

/// Write `records` to their table in batches of `batch_size`.
///
/// A `batch_size` of zero is treated as one.
pub async fn upsert_records<S, R>(sink: &S, records: &[R], batch_size: usize) -> BatchCounts
where
    S: RestSink + ?Sized,
    R: Record,
{
    let table = R::TABLE.as_str();
    let batch_size = batch_size.max(1);
    let total_batches = records.len().div_ceil(batch_size);
    let mut counts = BatchCounts::default();

    for (index, batch) in records.chunks(batch_size).enumerate() {
        info!(
            "{table}: batch {}/{total_batches} ({} records)",
            index + 1,
            batch.len()
        );
        counts += upsert_batch(sink, table, batch).await;
    }

    counts
}

async fn upsert_batch<S, R>(sink: &S, table: &str, batch: &[R]) -> BatchCounts
where
    S: RestSink + ?Sized,
    R: Record,
{
    let rows = match batch
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!("{table}: failed to serialize batch: {e}");
            return BatchCounts::new(0, batch.len());
        }
    };

    match sink.create_rows(table, &rows).await {
        Ok(CreateResponse::Created { count }) => {
            info!("{table}: created {count} records");
            if count < batch.len() {
                debug!(
                    "{table}: store reported {count} of {} submitted records",
                    batch.len()
                );
            }
            BatchCounts::new(count, 0)
        }
        Ok(CreateResponse::Conflict) => {
            warn!("{table}: primary key conflict, updating records one at a time");
            update_each(sink, table, batch, &rows).await
        }
        Ok(CreateResponse::Rejected { status, body }) => {
            warn!(
                "{table}: batch rejected with HTTP {status}: {}",
                truncate(&body, LOGGED_BODY_LEN)
            );
            BatchCounts::new(0, batch.len())
        }
        Err(e) => {
            warn!("{table}: batch failed: {e:#}");
            BatchCounts::new(0, batch.len())
        }
    }
}

async fn update_each<S, R>(sink: &S, table: &str, batch: &[R], rows: &[Value]) -> BatchCounts
where
    S: RestSink + ?Sized,
    R: Record,
{
    let mut counts = BatchCounts::default();

    for (record, row) in batch.iter().zip(rows) {
        let id = record.record_id();
        match sink.update_row(table, &id, row).await {
            Ok(UpdateResponse::Updated) => {
                debug!("{table}: updated {id}");
                counts.success += 1;
            }
            Ok(UpdateResponse::NoMatch) => {
                debug!("{table}: {id} not found, inserting it");
                if insert_one(sink, table, &id, row).await {
                    counts.success += 1;
                } else {
                    counts.failed += 1;
                }
            }
            Ok(UpdateResponse::Rejected { status, body }) => {
                warn!(
                    "{table}: update of {id} rejected with HTTP {status}: {}",
                    truncate(&body, LOGGED_BODY_LEN)
                );
                counts.failed += 1;
            }
            Err(e) => {
                warn!("{table}: update of {id} failed: {e:#}");
                counts.failed += 1;
            }
        }
    }

    counts
}

/// Insert a single row after its update matched nothing.
async fn insert_one<S>(sink: &S, table: &str, id: &RecordId, row: &Value) -> bool
where
    S: RestSink + ?Sized,
{
    match sink.create_rows(table, std::slice::from_ref(row)).await {
        Ok(CreateResponse::Created { count }) if count > 0 => {
            debug!("{table}: created {id}");
            true
        }
        Ok(CreateResponse::Created { .. }) => {
            warn!("{table}: store reported no row created for {id}");
            false
        }
        Ok(CreateResponse::Conflict) => {
            warn!("{table}: {id} conflicts on insert but matched no update");
            false
        }
        Ok(CreateResponse::Rejected { status, body }) => {
            warn!(
                "{table}: insert of {id} rejected with HTTP {status}: {}",
                truncate(&body, LOGGED_BODY_LEN)
            );
            false
        }
        Err(e) => {
            warn!("{table}: insert of {id} failed: {e:#}");
            false
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
