//! Per-table and whole-run import counts.

use std::fmt;
use sync_core::Table;

/// Outcome of importing one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableReport {
    pub table: Table,
    /// Data rows read from the source
    pub rows_read: usize,
    /// Rows excluded by the normalizer
    pub skipped: usize,
    pub success: usize,
    pub failed: usize,
}

impl TableReport {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            rows_read: 0,
            skipped: 0,
            success: 0,
            failed: 0,
        }
    }

    /// A table whose source could not be read or processed at all.
    pub fn table_failure(table: Table) -> Self {
        Self {
            failed: 1,
            ..Self::new(table)
        }
    }
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: read {}, skipped {}, succeeded {}, failed {}",
            self.table, self.rows_read, self.skipped, self.success, self.failed
        )
    }
}

/// Outcome of a full import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// One entry per enabled table, in processing order
    pub tables: Vec<TableReport>,
    /// Placeholder roles written for ids users referenced
    pub synthesized_roles: usize,
}

impl ImportReport {
    pub fn total_success(&self) -> usize {
        self.tables.iter().map(|t| t.success).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.tables.iter().map(|t| t.failed).sum()
    }

    /// Records handed to the store, successful or not.
    pub fn total_submitted(&self) -> usize {
        self.total_success() + self.total_failed()
    }
}
