//! Dependency resolver for users → roles.
//!
//! Every role a user references must exist before the user batch is sent.
//! Ids the store does not know are written as placeholder roles first. The
//! check and the create are separate calls, so a concurrent writer can slip
//! in between; the placeholders go through [`upsert_records`] and a
//! resulting conflict is absorbed as an update.

use rest_sink::{upsert_records, BatchCounts, RestSink};
use std::collections::BTreeSet;
use sync_core::{Record, RecordId, Role, User};
use tracing::{debug, info, warn};

/// What the resolver found and wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// Distinct role ids referenced by the users, sorted
    pub referenced: Vec<String>,
    /// Referenced ids the store reported as absent
    pub missing: Vec<String>,
    /// Result of writing placeholders for `missing`
    pub counts: BatchCounts,
}

/// Distinct non-blank role ids referenced by `users`, sorted.
pub fn referenced_roles(users: &[User]) -> Vec<String> {
    users
        .iter()
        .filter_map(|user| user.role.as_deref())
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Make sure every role referenced by `users` exists in the store.
///
/// A failed existence check is logged and the id is assumed present; users
/// pointing at it will then succeed or fail on the store's own constraint.
pub async fn ensure_roles_exist<S>(sink: &S, users: &[User]) -> ResolveOutcome
where
    S: RestSink + ?Sized,
{
    let table = Role::TABLE.as_str();
    let referenced = referenced_roles(users);
    let mut missing = Vec::new();

    for role_id in &referenced {
        let id = RecordId::Text(role_id.clone());
        match sink.row_exists(table, &id).await {
            Ok(true) => debug!("{table}: '{role_id}' exists"),
            Ok(false) => missing.push(role_id.clone()),
            Err(e) => warn!("{table}: could not check whether '{role_id}' exists: {e:#}"),
        }
    }

    let counts = if missing.is_empty() {
        BatchCounts::default()
    } else {
        info!(
            "{table}: creating {} missing roles referenced by users: {}",
            missing.len(),
            missing.join(", ")
        );
        let placeholders: Vec<Role> = missing.iter().map(Role::placeholder).collect();
        let counts = upsert_records(sink, &placeholders, placeholders.len()).await;
        if counts.failed > 0 {
            warn!(
                "{table}: {} placeholder roles could not be written; users referencing them may fail",
                counts.failed
            );
        }
        counts
    };

    ResolveOutcome {
        referenced,
        missing,
        counts,
    }
}
