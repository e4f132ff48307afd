//! Strictly-typed records written to the remote store.
//!
//! Records are built once by the normalizer and never mutated afterwards.
//! Optional fields serialize as `null` rather than being omitted, because a
//! bulk insert requires every object in the array to carry the same keys.

use crate::table::Table;
use chrono::NaiveDate;
use serde::Serialize;

/// Lowest permitted `level`.
pub const MIN_LEVEL: i32 = 1;
/// Highest permitted `level`.
pub const MAX_LEVEL: i32 = 4;
/// `level` used when the source value is absent or not numeric.
pub const DEFAULT_LEVEL: i32 = 4;

/// Icon assigned to roles that do not name one.
pub const DEFAULT_ROLE_ICON: &str = "Briefcase";
/// Color classes assigned to roles that do not name one.
pub const DEFAULT_ROLE_COLOR: &str = "bg-blue-100 text-blue-700";
/// Status assigned to tasks that do not name one.
pub const DEFAULT_TASK_STATUS: &str = "pending";

/// Primary key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{i}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// A record that belongs to exactly one remote table.
pub trait Record: Serialize + Send + Sync {
    /// Table the record is written to.
    const TABLE: Table;

    /// Primary key used for conflict fallback updates.
    fn record_id(&self) -> RecordId;
}

/// A role that users can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Role {
    /// Non-empty primary key
    pub id: String,
    /// Display name, defaults to `id`
    pub name: String,
    pub icon_name: String,
    pub color: String,
    /// Seniority in `[MIN_LEVEL, MAX_LEVEL]`
    pub level: i32,
    pub webhook: Option<String>,
    pub is_default: bool,
}

impl Role {
    /// Minimal role synthesized for an id that users reference but the
    /// store does not contain.
    pub fn placeholder(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            icon_name: DEFAULT_ROLE_ICON.to_string(),
            color: DEFAULT_ROLE_COLOR.to_string(),
            level: DEFAULT_LEVEL,
            webhook: None,
            is_default: false,
        }
    }
}

impl Record for Role {
    const TABLE: Table = Table::Roles;

    fn record_id(&self) -> RecordId {
        RecordId::Text(self.id.clone())
    }
}

/// A person who assigns or works on tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    /// Required, never blank
    pub name: String,
    /// Foreign key to [`Role::id`]
    pub role: Option<String>,
    pub level: i32,
    pub mail: Option<String>,
    pub employee_id: Option<String>,
    pub headshot: Option<String>,
}

impl Record for User {
    const TABLE: Table = Table::Users;

    fn record_id(&self) -> RecordId {
        RecordId::Int(self.id)
    }
}

/// A unit of assigned work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub assigner_id: Option<i64>,
    pub assigner_name: Option<String>,
    pub assignee_id: Option<i64>,
    pub assignee_name: Option<String>,
    pub collaborator_ids: Vec<i64>,
    pub role_category: Option<String>,
    /// Serialized as `YYYY-MM-DD`
    pub plan_date: Option<NaiveDate>,
    pub interim_date: Option<NaiveDate>,
    pub final_date: Option<NaiveDate>,
    pub status: String,
    pub assignee_response: Option<String>,
    pub evidence: Vec<serde_json::Value>,
}

impl Record for Task {
    const TABLE: Table = Table::Tasks;

    fn record_id(&self) -> RecordId {
        RecordId::Int(self.id)
    }
}
