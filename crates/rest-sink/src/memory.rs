//! In-memory `RestSink` with the same conflict semantics as the remote store.
//!
//! Used by pipeline tests: it keeps rows per table, answers a bulk create
//! that hits an existing key with [`CreateResponse::Conflict`] without
//! inserting anything, and records every call so tests can assert on order.
//! Failures can be injected per table or per record.

use crate::traits::{CreateResponse, RestSink, UpdateResponse};
use anyhow::Result;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use sync_core::RecordId;

/// One call observed by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Create { table: String, ids: Vec<RecordId> },
    Update { table: String, id: RecordId },
    Exists { table: String, id: RecordId },
}

impl SinkCall {
    pub fn table(&self) -> &str {
        match self {
            SinkCall::Create { table, .. }
            | SinkCall::Update { table, .. }
            | SinkCall::Exists { table, .. } => table,
        }
    }
}

#[derive(Default)]
struct State {
    tables: HashMap<String, BTreeMap<RecordId, Value>>,
    calls: Vec<SinkCall>,
    rejected_creates: HashMap<String, u16>,
    unreachable: HashSet<String>,
    rejected_updates: HashSet<(String, RecordId)>,
}

#[derive(Default)]
pub struct MemorySink {
    state: Mutex<State>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `table` with existing rows.
    pub fn with_rows(self, table: &str, rows: impl IntoIterator<Item = Value>) -> Self {
        {
            let mut state = self.lock();
            let entries = state.tables.entry(table.to_string()).or_default();
            for row in rows {
                if let Some(id) = row_id(&row) {
                    entries.insert(id, row);
                }
            }
        }
        self
    }

    /// Make every bulk create on `table` fail with `status`.
    pub fn reject_creates(self, table: &str, status: u16) -> Self {
        self.lock().rejected_creates.insert(table.to_string(), status);
        self
    }

    /// Make every call on `table` fail at the transport level.
    pub fn unreachable(self, table: &str) -> Self {
        self.lock().unreachable.insert(table.to_string());
        self
    }

    /// Make updates of `id` in `table` fail with a 400.
    pub fn reject_update(self, table: &str, id: RecordId) -> Self {
        self.lock().rejected_updates.insert((table.to_string(), id));
        self
    }

    /// Rows currently stored in `table`, ordered by primary key.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock()
            .tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn row_id(row: &Value) -> Option<RecordId> {
    match row.get("id")? {
        Value::Number(n) => n.as_i64().map(RecordId::Int),
        Value::String(s) => Some(RecordId::Text(s.clone())),
        _ => None,
    }
}

#[async_trait::async_trait]
impl RestSink for MemorySink {
    async fn create_rows(&self, table: &str, rows: &[Value]) -> Result<CreateResponse> {
        let mut state = self.lock();
        let ids: Vec<Option<RecordId>> = rows.iter().map(row_id).collect();
        state.calls.push(SinkCall::Create {
            table: table.to_string(),
            ids: ids.iter().flatten().cloned().collect(),
        });

        if state.unreachable.contains(table) {
            anyhow::bail!("connection refused: {table}");
        }
        if let Some(status) = state.rejected_creates.get(table) {
            return Ok(CreateResponse::Rejected {
                status: *status,
                body: format!("create rejected for {table}"),
            });
        }
        if ids.iter().any(Option::is_none) {
            return Ok(CreateResponse::Rejected {
                status: 400,
                body: "row without id".to_string(),
            });
        }

        let existing = state.tables.entry(table.to_string()).or_default();
        let mut seen = HashSet::new();
        let duplicate = ids
            .iter()
            .flatten()
            .any(|id| existing.contains_key(id) || !seen.insert(id.clone()));
        if duplicate {
            return Ok(CreateResponse::Conflict);
        }

        for (id, row) in ids.into_iter().flatten().zip(rows) {
            existing.insert(id, row.clone());
        }
        Ok(CreateResponse::Created { count: rows.len() })
    }

    async fn update_row(
        &self,
        table: &str,
        id: &RecordId,
        row: &Value,
    ) -> Result<UpdateResponse> {
        let mut state = self.lock();
        state.calls.push(SinkCall::Update {
            table: table.to_string(),
            id: id.clone(),
        });

        if state.unreachable.contains(table) {
            anyhow::bail!("connection refused: {table}");
        }
        if state
            .rejected_updates
            .contains(&(table.to_string(), id.clone()))
        {
            return Ok(UpdateResponse::Rejected {
                status: 400,
                body: format!("update rejected for {id}"),
            });
        }

        match state
            .tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id))
        {
            Some(existing) => {
                *existing = row.clone();
                Ok(UpdateResponse::Updated)
            }
            None => Ok(UpdateResponse::NoMatch),
        }
    }

    async fn row_exists(&self, table: &str, id: &RecordId) -> Result<bool> {
        let mut state = self.lock();
        state.calls.push(SinkCall::Exists {
            table: table.to_string(),
            id: id.clone(),
        });

        if state.unreachable.contains(table) {
            anyhow::bail!("connection refused: {table}");
        }
        Ok(state
            .tables
            .get(table)
            .is_some_and(|rows| rows.contains_key(id)))
    }
}
