//! Sequence fields stored as JSON or as a comma-separated list.
//!
//! Both parsers try JSON first, then a comma-separated integer list, and
//! finally give up with an empty sequence. Input that is neither is dropped
//! silently.

use serde_json::Value;

/// Parse a sequence of integers such as `collaborator_ids`.
pub fn parse_int_list(raw: Option<&str>) -> Vec<i64> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Vec::new();
    };

    if let Ok(ids) = serde_json::from_str::<Vec<i64>>(value) {
        return ids;
    }

    comma_separated_ints(value).unwrap_or_default()
}

/// Parse a sequence of arbitrary JSON values such as `evidence`.
pub fn parse_json_list(raw: Option<&str>) -> Vec<Value> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Vec::new();
    };

    if let Ok(items) = serde_json::from_str::<Vec<Value>>(value) {
        return items;
    }

    comma_separated_ints(value)
        .map(|ints| ints.into_iter().map(Value::from).collect())
        .unwrap_or_default()
}

fn comma_separated_ints(value: &str) -> Option<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<i64>().ok())
        .collect()
}
