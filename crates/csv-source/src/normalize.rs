//! Row normalizer: loosely-typed [`SourceRow`] to strictly-typed record.
//!
//! Each function is total. A row either becomes a record or a
//! [`Normalized::Skip`] carrying the reason; nothing here returns an error
//! or panics past the boundary.

use csv_types::{
    parse_bool, parse_date, parse_id_or, parse_int_list, parse_json_list, parse_level,
    parse_optional_int, text, CsvParseError, LevelRule,
};
use sync_core::{
    Normalized, Role, SkipReason, SourceRow, Task, User, DEFAULT_ROLE_COLOR, DEFAULT_ROLE_ICON,
    DEFAULT_TASK_STATUS,
};

/// Columns that may carry a user's mail address, in priority order.
const MAIL_COLUMNS: [&str; 2] = ["Mail", "mail"];
/// Columns that may carry a user's employee id, in priority order.
const EMPLOYEE_ID_COLUMNS: [&str; 3] = ["ID4", "id4", "employee_id"];

/// Per-table state shared by every row of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeContext {
    /// Epoch milliseconds captured when the table was read
    pub now_millis: i64,
}

impl NormalizeContext {
    pub fn new(now_millis: i64) -> Self {
        Self { now_millis }
    }

    /// Context stamped with the current wall-clock time.
    pub fn now() -> Self {
        Self::new(chrono::Utc::now().timestamp_millis())
    }

    /// Identifier for a row whose own id is absent or not an integer.
    pub fn synthesized_id(&self, line: usize) -> i64 {
        self.now_millis.saturating_add(line as i64)
    }
}

pub fn normalize_role(row: &SourceRow) -> Normalized<Role> {
    Normalized::from_result(row.line, role_from_row(row))
}

fn role_from_row(row: &SourceRow) -> Result<Role, SkipReason> {
    let id = text(row.get("id")).ok_or(SkipReason::MissingField { field: "id" })?;

    Ok(Role {
        name: text(row.get("name")).unwrap_or_else(|| id.clone()),
        icon_name: text(row.get("icon_name")).unwrap_or_else(|| DEFAULT_ROLE_ICON.to_string()),
        color: text(row.get("color")).unwrap_or_else(|| DEFAULT_ROLE_COLOR.to_string()),
        level: parse_level(row.get("level"), LevelRule::Clamp),
        webhook: text(row.get("webhook")),
        is_default: parse_bool(row.get("is_default")),
        id,
    })
}

pub fn normalize_user(row: &SourceRow, ctx: &NormalizeContext) -> Normalized<User> {
    Normalized::from_result(row.line, user_from_row(row, ctx))
}

fn user_from_row(row: &SourceRow, ctx: &NormalizeContext) -> Result<User, SkipReason> {
    let name = text(row.get("name")).ok_or(SkipReason::MissingField { field: "name" })?;

    Ok(User {
        id: parse_id_or(row.get("id"), ctx.synthesized_id(row.line)),
        name,
        role: text(row.get("role")),
        level: parse_level(row.get("level"), LevelRule::RemapFive),
        mail: text(row.first_of(&MAIL_COLUMNS)),
        employee_id: text(row.first_of(&EMPLOYEE_ID_COLUMNS)),
        headshot: text(row.get("headshot")),
    })
}

pub fn normalize_task(row: &SourceRow, ctx: &NormalizeContext) -> Normalized<Task> {
    Normalized::from_result(row.line, task_from_row(row, ctx))
}

fn task_from_row(row: &SourceRow, ctx: &NormalizeContext) -> Result<Task, SkipReason> {
    Ok(Task {
        id: parse_id_or(row.get("id"), ctx.synthesized_id(row.line)),
        title: text(row.get("title")).unwrap_or_else(|| format!("Task {}", row.line)),
        description: text(row.get("description")),
        assigner_id: foreign_id(row, "assigner_id")?,
        assigner_name: text(row.get("assigner_name")),
        assignee_id: foreign_id(row, "assignee_id")?,
        assignee_name: text(row.get("assignee_name")),
        collaborator_ids: parse_int_list(row.get("collaborator_ids")),
        role_category: text(row.get("role_category")),
        plan_date: parse_date(row.get("plan_date")),
        interim_date: parse_date(row.get("interim_date")),
        final_date: parse_date(row.get("final_date")),
        status: text(row.get("status")).unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string()),
        assignee_response: text(row.get("assignee_response")),
        evidence: parse_json_list(row.get("evidence")),
    })
}

fn foreign_id(row: &SourceRow, field: &'static str) -> Result<Option<i64>, SkipReason> {
    parse_optional_int(row.get(field)).map_err(|CsvParseError { value, message, .. }| {
        SkipReason::InvalidField {
            field,
            value,
            message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use sync_core::{DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};

    const NOW: i64 = 1_700_000_000_000;

    fn ctx() -> NormalizeContext {
        NormalizeContext::new(NOW)
    }

    #[test]
    fn test_role_defaults_and_clamp() {
        let row = SourceRow::from_pairs(2, [("id", "mgr"), ("name", ""), ("level", "9")]);
        let role = normalize_role(&row).record().unwrap();

        assert_eq!(role.id, "mgr");
        assert_eq!(role.name, "mgr");
        assert_eq!(role.level, 4);
        assert_eq!(role.icon_name, "Briefcase");
        assert_eq!(role.color, "bg-blue-100 text-blue-700");
        assert_eq!(role.webhook, None);
        assert!(!role.is_default);
    }

    #[test]
    fn test_role_explicit_fields() {
        let row = SourceRow::from_pairs(
            3,
            [
                ("id", " dev "),
                ("name", "Developer"),
                ("icon_name", "Code"),
                ("color", "bg-green-100"),
                ("level", "0"),
                ("webhook", "https://hooks.example.com/dev"),
                ("is_default", "TRUE"),
            ],
        );
        let role = normalize_role(&row).record().unwrap();

        assert_eq!(role.id, "dev");
        assert_eq!(role.name, "Developer");
        assert_eq!(role.icon_name, "Code");
        assert_eq!(role.level, MIN_LEVEL);
        assert_eq!(role.webhook.as_deref(), Some("https://hooks.example.com/dev"));
        assert!(role.is_default);
    }

    #[test]
    fn test_role_without_id_is_skipped() {
        for id in ["", "   "] {
            let row = SourceRow::from_pairs(4, [("id", id), ("name", "Ghost")]);
            assert_eq!(
                normalize_role(&row),
                Normalized::Skip {
                    line: 4,
                    reason: SkipReason::MissingField { field: "id" }
                }
            );
        }
        let row = SourceRow::from_pairs(5, [("name", "No id column")]);
        assert!(normalize_role(&row).is_skip());
    }

    #[test]
    fn test_role_level_five_is_clamped_not_remapped() {
        let row = SourceRow::from_pairs(2, [("id", "a"), ("level", "5")]);
        assert_eq!(normalize_role(&row).record().unwrap().level, MAX_LEVEL);

        let row = SourceRow::from_pairs(2, [("id", "a"), ("level", "2")]);
        assert_eq!(normalize_role(&row).record().unwrap().level, 2);
    }

    #[test]
    fn test_user_synthesized_id_and_level_remap() {
        let row = SourceRow::from_pairs(2, [("name", "Alice"), ("role", "mgr"), ("level", "5")]);
        let user = normalize_user(&row, &ctx()).record().unwrap();

        assert_eq!(user.id, NOW + 2);
        assert!(user.id > 0);
        assert_eq!(user.level, 4);
        assert_eq!(user.role.as_deref(), Some("mgr"));
    }

    #[test]
    fn test_user_levels_stay_in_range() {
        for (raw, expected) in [
            ("5", 4),
            ("1", 1),
            ("-3", MIN_LEVEL),
            ("99", MAX_LEVEL),
            ("senior", DEFAULT_LEVEL),
            ("", DEFAULT_LEVEL),
            ("99999999999999999999", MAX_LEVEL),
        ] {
            let row = SourceRow::from_pairs(2, [("name", "Bob"), ("level", raw)]);
            let user = normalize_user(&row, &ctx()).record().unwrap();
            assert_eq!(user.level, expected, "level input {raw:?}");
        }
    }

    #[test]
    fn test_user_keeps_valid_id_and_replaces_invalid() {
        let row = SourceRow::from_pairs(7, [("id", "42"), ("name", "Carol")]);
        assert_eq!(normalize_user(&row, &ctx()).record().unwrap().id, 42);

        let row = SourceRow::from_pairs(7, [("id", "abc"), ("name", "Carol")]);
        assert_eq!(normalize_user(&row, &ctx()).record().unwrap().id, NOW + 7);
    }

    #[test]
    fn test_user_column_aliases() {
        let row = SourceRow::from_pairs(
            2,
            [
                ("name", "Dana"),
                ("Mail", " "),
                ("mail", "dana@example.com"),
                ("ID4", "E-100"),
                ("employee_id", "ignored"),
            ],
        );
        let user = normalize_user(&row, &ctx()).record().unwrap();
        assert_eq!(user.mail.as_deref(), Some("dana@example.com"));
        assert_eq!(user.employee_id.as_deref(), Some("E-100"));

        let row = SourceRow::from_pairs(2, [("name", "Eve"), ("employee_id", "E-7")]);
        let user = normalize_user(&row, &ctx()).record().unwrap();
        assert_eq!(user.mail, None);
        assert_eq!(user.employee_id.as_deref(), Some("E-7"));
    }

    #[test]
    fn test_user_blank_name_is_skipped() {
        let row = SourceRow::from_pairs(9, [("name", "  "), ("role", "mgr")]);
        assert_eq!(
            normalize_user(&row, &ctx()),
            Normalized::Skip {
                line: 9,
                reason: SkipReason::MissingField { field: "name" }
            }
        );
    }

    #[test]
    fn test_user_blank_optionals_are_absent() {
        let row = SourceRow::from_pairs(2, [("name", "Finn"), ("role", ""), ("headshot", " ")]);
        let user = normalize_user(&row, &ctx()).record().unwrap();
        assert_eq!(user.role, None);
        assert_eq!(user.headshot, None);
    }

    #[test]
    fn test_task_defaults() {
        let row = SourceRow::from_pairs(6, [("title", ""), ("status", "")]);
        let task = normalize_task(&row, &ctx()).record().unwrap();

        assert_eq!(task.id, NOW + 6);
        assert_eq!(task.title, "Task 6");
        assert_eq!(task.status, "pending");
        assert!(task.collaborator_ids.is_empty());
        assert!(task.evidence.is_empty());
        assert_eq!(task.plan_date, None);
        assert_eq!(task.assigner_id, None);
    }

    #[test]
    fn test_task_full_row() {
        let row = SourceRow::from_pairs(
            2,
            [
                ("id", "100"),
                ("title", "Quarterly report"),
                ("assigner_id", "1"),
                ("assignee_id", " 2 "),
                ("assignee_name", "Bob"),
                ("collaborator_ids", "[3, 4]"),
                ("plan_date", "03/09/2024"),
                ("interim_date", "2024/03/15 09:30:00"),
                ("final_date", "not a date"),
                ("status", "in_progress"),
                ("evidence", r#"[{"url": "https://example.com/a.png"}]"#),
            ],
        );
        let task = normalize_task(&row, &ctx()).record().unwrap();

        assert_eq!(task.id, 100);
        assert_eq!(task.assigner_id, Some(1));
        assert_eq!(task.assignee_id, Some(2));
        assert_eq!(task.assignee_name.as_deref(), Some("Bob"));
        assert_eq!(task.collaborator_ids, vec![3, 4]);
        assert_eq!(task.plan_date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(task.interim_date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(task.final_date, None);
        assert_eq!(task.status, "in_progress");
        assert_eq!(task.evidence, vec![json!({"url": "https://example.com/a.png"})]);
    }

    #[test]
    fn test_task_malformed_lists_become_empty() {
        for raw in ["{not json", "a,b,c", "[1, \"x\"", "1;2"] {
            let row = SourceRow::from_pairs(2, [("collaborator_ids", raw), ("evidence", raw)]);
            let task = normalize_task(&row, &ctx()).record().unwrap();
            assert!(task.collaborator_ids.is_empty(), "collaborators from {raw:?}");
            assert!(task.evidence.is_empty(), "evidence from {raw:?}");
        }

        let row = SourceRow::from_pairs(2, [("collaborator_ids", "5, 6"), ("evidence", "7,8")]);
        let task = normalize_task(&row, &ctx()).record().unwrap();
        assert_eq!(task.collaborator_ids, vec![5, 6]);
        assert_eq!(task.evidence, vec![json!(7), json!(8)]);
    }

    #[test]
    fn test_task_invalid_foreign_id_is_skipped() {
        let row = SourceRow::from_pairs(4, [("title", "t"), ("assignee_id", "bob")]);
        match normalize_task(&row, &ctx()) {
            Normalized::Skip {
                line,
                reason: SkipReason::InvalidField { field, value, .. },
            } => {
                assert_eq!(line, 4);
                assert_eq!(field, "assignee_id");
                assert_eq!(value, "bob");
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn test_synthesized_ids_are_unique_within_a_file() {
        let ctx = ctx();
        let ids: std::collections::HashSet<i64> =
            (2..200).map(|line| ctx.synthesized_id(line)).collect();
        assert_eq!(ids.len(), 198);
        assert!(NormalizeContext::now().now_millis > 0);
    }
}
