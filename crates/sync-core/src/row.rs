//! Source rows and the result of normalizing them.

use std::collections::HashMap;

/// One CSV data row as a mapping from column name to raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    /// 1-based line number in the source file (the header is line 1)
    pub line: usize,
    /// Column name to raw cell text
    pub fields: HashMap<String, String>,
}

impl SourceRow {
    pub fn new(line: usize, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<'a>(line: usize, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { line, fields }
    }

    /// Raw cell text, untrimmed. `None` if the column is absent.
    pub fn raw(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Trimmed cell text, `None` if the column is absent or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.raw(column).map(str::trim).filter(|v| !v.is_empty())
    }

    /// First non-blank value among several column aliases.
    pub fn first_of(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|c| self.get(c))
    }
}

/// Why a row was excluded from submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid value '{value}' for `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        value: String,
        message: String,
    },
}

/// Tagged outcome of converting a [`SourceRow`] into a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    /// The row produced a well-formed record
    Record(T),
    /// The row was excluded; `line` locates it in the source
    Skip { line: usize, reason: SkipReason },
}

impl<T> Normalized<T> {
    /// Wrap a fallible conversion of the row at `line`.
    pub fn from_result(line: usize, result: Result<T, SkipReason>) -> Self {
        match result {
            Ok(record) => Normalized::Record(record),
            Err(reason) => Normalized::Skip { line, reason },
        }
    }

    pub fn record(self) -> Option<T> {
        match self {
            Normalized::Record(record) => Some(record),
            Normalized::Skip { .. } => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Normalized::Skip { .. })
    }
}
