//! RestSink trait definition.
//!
//! This trait abstracts over the remote store, allowing the import pipeline
//! to be compiled against a single interface that works with the HTTP
//! implementation and with the in-memory one used by tests.

use anyhow::Result;
use serde_json::Value;
use sync_core::RecordId;

/// Outcome of a bulk create that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateResponse {
    /// Rows were inserted. `count` is what the store reports, which may be
    /// fewer than were submitted.
    Created { count: usize },
    /// At least one primary key already exists; nothing was inserted.
    Conflict,
    /// Any other non-success status.
    Rejected { status: u16, body: String },
}

/// Outcome of a point update that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResponse {
    Updated,
    /// The filter matched no row; nothing was written.
    NoMatch,
    Rejected { status: u16, body: String },
}

/// Trait for writing rows to the remote store.
///
/// An `Err` from any method means the call did not produce a usable
/// response (transport failure, malformed body). Status-level failures are
/// reported through the response enums instead.
///
/// # Usage Pattern
///
/// Pipeline code uses generics for static dispatch:
///
/// ```ignore
/// pub async fn import_roles<S: RestSink>(sink: &S, roles: &[Role]) -> BatchCounts {
///     upsert_records(sink, roles, 10).await
/// }
/// ```
#[async_trait::async_trait]
pub trait RestSink: Send + Sync {
    /// Insert `rows` into `table` in one bulk request.
    async fn create_rows(&self, table: &str, rows: &[Value]) -> Result<CreateResponse>;

    /// Update the row of `table` whose primary key is `id` with `row`.
    async fn update_row(&self, table: &str, id: &RecordId, row: &Value)
        -> Result<UpdateResponse>;

    /// Whether `table` holds a row whose primary key is `id`.
    async fn row_exists(&self, table: &str, id: &RecordId) -> Result<bool>;
}
