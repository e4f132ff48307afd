//! Run aggregator
//!
//! Drives the roles, users and tasks pipelines in dependency order and folds
//! their counts into one [`ImportReport`].

use anyhow::Result;
use rest_sink::{upsert_records, RestSink, DEFAULT_BATCH_SIZE};
use supabase_sync_file::FileSource;
use sync_core::{Normalized, Record, SourceRow, Table};
use tracing::{error, info, warn};

use crate::normalize::{normalize_role, normalize_task, normalize_user, NormalizeContext};
use crate::reader::read_source;
use crate::report::{ImportReport, TableReport};
use crate::resolver::{ensure_roles_exist, referenced_roles};

/// Configuration for a CSV import
#[derive(Clone, Debug)]
pub struct Config {
    /// Source of role rows
    pub roles: Option<FileSource>,

    /// Source of user rows
    pub users: Option<FileSource>,

    /// Source of task rows
    pub tasks: Option<FileSource>,

    /// Number of records per bulk create
    pub batch_size: usize,

    /// Read and normalize only; nothing is sent to the store
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roles: None,
            users: None,
            tasks: None,
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

impl Config {
    /// Source configured for `table`, if any.
    pub fn source(&self, table: Table) -> Option<&FileSource> {
        match table {
            Table::Roles => self.roles.as_ref(),
            Table::Users => self.users.as_ref(),
            Table::Tasks => self.tasks.as_ref(),
        }
    }
}

/// Import every configured table into `sink`.
///
/// Tables run strictly in the order roles, users, tasks. A table whose
/// source cannot be read is reported as one failure and the run continues.
/// Only a configuration without any source is an error.
pub async fn sync<S>(sink: &S, config: &Config) -> Result<ImportReport>
where
    S: RestSink + ?Sized,
{
    if Table::ALL.iter().all(|t| config.source(*t).is_none()) {
        anyhow::bail!("No CSV source configured; provide at least one of roles, users or tasks");
    }

    if config.dry_run {
        info!("Dry run: records are normalized but not written");
    }

    let mut report = ImportReport::default();

    for table in Table::ALL {
        let Some(source) = config.source(table) else {
            continue;
        };
        info!("Processing {table} from: {}", source.display_name());

        let table_report = match table {
            Table::Roles => {
                import_table(sink, config, table, source, |row, _| normalize_role(row)).await
            }
            Table::Users => {
                import_users(sink, config, source, &mut report.synthesized_roles).await
            }
            Table::Tasks => import_table(sink, config, table, source, normalize_task).await,
        };

        let table_report = table_report.unwrap_or_else(|e| {
            error!("{table}: import failed: {e:#}");
            TableReport::table_failure(table)
        });
        info!("{table_report}");
        report.tables.push(table_report);
    }

    info!(
        "Import finished: {} succeeded, {} failed, {} placeholder roles created",
        report.total_success(),
        report.total_failed(),
        report.synthesized_roles
    );
    if report.total_success() == 0 && report.total_submitted() > 0 {
        warn!("No records were imported successfully");
    }

    Ok(report)
}

async fn import_users<S>(
    sink: &S,
    config: &Config,
    source: &FileSource,
    synthesized_roles: &mut usize,
) -> Result<TableReport>
where
    S: RestSink + ?Sized,
{
    let (mut report, users) = load(Table::Users, source, normalize_user).await?;

    if config.dry_run {
        let roles = referenced_roles(&users);
        if !roles.is_empty() {
            info!("users: reference roles {}", roles.join(", "));
        }
        report.success = users.len();
        return Ok(report);
    }

    let outcome = ensure_roles_exist(sink, &users).await;
    *synthesized_roles += outcome.counts.success;

    let counts = upsert_records(sink, &users, config.batch_size).await;
    report.success = counts.success;
    report.failed = counts.failed;
    Ok(report)
}

async fn import_table<S, R, F>(
    sink: &S,
    config: &Config,
    table: Table,
    source: &FileSource,
    normalize: F,
) -> Result<TableReport>
where
    S: RestSink + ?Sized,
    R: Record,
    F: Fn(&SourceRow, &NormalizeContext) -> Normalized<R>,
{
    let (mut report, records) = load(table, source, normalize).await?;

    if config.dry_run {
        report.success = records.len();
    } else {
        let counts = upsert_records(sink, &records, config.batch_size).await;
        report.success = counts.success;
        report.failed = counts.failed;
    }

    Ok(report)
}

/// Read and normalize one source. Skipped rows are logged with their line.
async fn load<R, F>(table: Table, source: &FileSource, normalize: F) -> Result<(TableReport, Vec<R>)>
where
    F: Fn(&SourceRow, &NormalizeContext) -> Normalized<R>,
{
    let rows = read_source(source).await?;
    let ctx = NormalizeContext::now();
    let mut report = TableReport::new(table);
    report.rows_read = rows.len();

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        match normalize(row, &ctx) {
            Normalized::Record(record) => records.push(record),
            Normalized::Skip { line, reason } => {
                warn!("{table}: skipping line {line}: {reason}");
                report.skipped += 1;
            }
        }
    }

    info!(
        "{table}: read {} rows, {} records to import",
        report.rows_read,
        records.len()
    );
    Ok((report, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rest_sink::{MemorySink, SinkCall};
    use serde_json::json;
    use std::io::Write;
    use sync_core::RecordId;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn source(file: &NamedTempFile) -> Option<FileSource> {
        Some(FileSource::Local(file.path().to_path_buf()))
    }

    #[tokio::test]
    async fn test_full_import_in_dependency_order() {
        let roles = csv_file("id,name,level\nmgr,Manager,2\ndev,,9\n,Nameless,1\n");
        let users = csv_file("id;name;role;level\n1;Alice;mgr;5\n2;Bob;temp;3\n3;;dev;1\n");
        let tasks = csv_file(
            "id,title,assigner_id,assignee_id,collaborator_ids,plan_date\n\
             10,Report,1,2,\"[1,2]\",2024-03-09\n\
             11,,1,,,\n",
        );
        let sink = MemorySink::new();
        let config = Config {
            roles: source(&roles),
            users: source(&users),
            tasks: source(&tasks),
            ..Config::default()
        };

        let report = sync(&sink, &config).await.unwrap();

        assert_eq!(
            report.tables,
            vec![
                TableReport {
                    table: Table::Roles,
                    rows_read: 3,
                    skipped: 1,
                    success: 2,
                    failed: 0
                },
                TableReport {
                    table: Table::Users,
                    rows_read: 3,
                    skipped: 1,
                    success: 2,
                    failed: 0
                },
                TableReport {
                    table: Table::Tasks,
                    rows_read: 2,
                    skipped: 0,
                    success: 2,
                    failed: 0
                },
            ]
        );
        assert_eq!(report.synthesized_roles, 1);
        assert_eq!(report.total_failed(), 0);

        let tables: Vec<String> = sink
            .calls()
            .iter()
            .map(|call| call.table().to_string())
            .collect();
        let first_user = tables.iter().position(|t| t == "users").unwrap();
        let last_role = tables.iter().rposition(|t| t == "roles").unwrap();
        let first_task = tables.iter().position(|t| t == "tasks").unwrap();
        assert!(last_role < first_user);
        assert!(first_user < first_task);

        let stored_users = sink.rows("users");
        assert_eq!(stored_users[0]["level"], json!(4));
        let stored_tasks = sink.rows("tasks");
        assert_eq!(stored_tasks[0]["plan_date"], json!("2024-03-09"));
        assert_eq!(stored_tasks[1]["title"], json!("Task 3"));
    }

    #[tokio::test]
    async fn test_placeholder_role_precedes_user_batch() {
        let users = csv_file("name,role\nAlice,temp\n");
        let sink = MemorySink::new();
        let config = Config {
            users: source(&users),
            ..Config::default()
        };

        let report = sync(&sink, &config).await.unwrap();

        assert_eq!(report.synthesized_roles, 1);
        let calls = sink.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            SinkCall::Create {
                table: "roles".to_string(),
                ids: vec![RecordId::Text("temp".to_string())]
            }
        );
        assert!(matches!(&calls[2], SinkCall::Create { table, .. } if table == "users"));
    }

    #[tokio::test]
    async fn test_unreadable_source_counts_one_failure_and_continues() {
        let tasks = csv_file("title\nWrite docs\n");
        let sink = MemorySink::new();
        let config = Config {
            roles: FileSource::parse("/nonexistent/roles_rows.csv").ok(),
            tasks: source(&tasks),
            ..Config::default()
        };

        let report = sync(&sink, &config).await.unwrap();

        assert_eq!(report.tables[0], TableReport::table_failure(Table::Roles));
        assert_eq!(report.tables[1].success, 1);
        assert_eq!(report.total_failed(), 1);
    }

    #[tokio::test]
    async fn test_rerun_updates_through_conflict_path() {
        let roles = csv_file("id,name\nmgr,Manager\nqa,QA\n");
        let sink = MemorySink::new().with_rows("roles", [json!({"id": "mgr", "name": "Old"})]);
        let config = Config {
            roles: source(&roles),
            ..Config::default()
        };

        let report = sync(&sink, &config).await.unwrap();

        assert_eq!(report.total_success(), 2);
        let updates = sink
            .calls()
            .into_iter()
            .filter(|call| matches!(call, SinkCall::Update { .. }))
            .count();
        assert_eq!(updates, 2);
        assert_eq!(sink.rows("roles")[0]["name"], json!("Manager"));
    }

    #[tokio::test]
    async fn test_store_failures_are_counted_not_fatal() {
        let users = csv_file("id,name\n1,A\n2,B\n3,C\n");
        let sink = MemorySink::new().reject_creates("users", 500);
        let config = Config {
            users: source(&users),
            batch_size: 2,
            ..Config::default()
        };

        let report = sync(&sink, &config).await.unwrap();

        assert_eq!(report.total_success(), 0);
        assert_eq!(report.total_failed(), 3);
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_calls() {
        let users = csv_file("name,role\nAlice,temp\n,ghost\n");
        let sink = MemorySink::new();
        let config = Config {
            users: source(&users),
            dry_run: true,
            ..Config::default()
        };

        let report = sync(&sink, &config).await.unwrap();

        assert!(sink.calls().is_empty());
        assert_eq!(report.tables[0].success, 1);
        assert_eq!(report.tables[0].skipped, 1);
        assert_eq!(report.synthesized_roles, 0);
    }

    #[tokio::test]
    async fn test_no_sources_is_error() {
        let sink = MemorySink::new();
        assert!(sync(&sink, &Config::default()).await.is_err());
    }
}
