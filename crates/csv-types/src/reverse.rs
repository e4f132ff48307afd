//! Reverse conversion: CSV string → typed scalar fields.

use sync_core::{DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};

/// Error type for CSV parsing failures that have no fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to parse '{value}' as {expected_type}: {message}")]
pub struct CsvParseError {
    pub message: String,
    pub value: String,
    pub expected_type: String,
}

/// How a `level` value is brought into `[MIN_LEVEL, MAX_LEVEL]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRule {
    /// Clamp into range
    Clamp,
    /// Remap the legacy value 5 to 4, then clamp
    RemapFive,
}

/// Trimmed, owned text; blank becomes `None`.
pub fn text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Lenient boolean: `true`, `1`, `yes`, `y`, `t` (any case) are true,
/// everything else including blank is false.
pub fn parse_bool(raw: Option<&str>) -> bool {
    match raw.map(|v| v.trim().to_lowercase()) {
        Some(v) => matches!(v.as_str(), "true" | "1" | "yes" | "y" | "t"),
        None => false,
    }
}

/// Parse a level and force it into `[MIN_LEVEL, MAX_LEVEL]`.
///
/// Absent or non-numeric input yields `DEFAULT_LEVEL`. Integers too large
/// for `i64` clamp by sign.
pub fn parse_level(raw: Option<&str>, rule: LevelRule) -> i32 {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_LEVEL;
    };

    let parsed = match value.parse::<i64>() {
        Ok(v) => v,
        Err(_) if is_integer_literal(value) => {
            if value.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }
        Err(_) => return DEFAULT_LEVEL,
    };

    let parsed = match rule {
        LevelRule::RemapFive if parsed == 5 => 4,
        _ => parsed,
    };

    parsed.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as i32
}

/// Parse an optional integer column. Blank is `Ok(None)`, garbage is an error.
pub fn parse_optional_int(raw: Option<&str>) -> Result<Option<i64>, CsvParseError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<i64>().map(Some).map_err(|e| CsvParseError {
            message: e.to_string(),
            value: value.to_string(),
            expected_type: "BigInt".to_string(),
        }),
    }
}

/// Parse an integer identifier, using `fallback` when the cell is blank or
/// not an integer.
pub fn parse_id_or(raw: Option<&str>, fallback: i64) -> i64 {
    raw.map(str::trim)
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(fallback)
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text() {
        assert_eq!(text(Some("  hi ")), Some("hi".to_string()));
        assert_eq!(text(Some("   ")), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "TRUE", "1", "yes", "Y", "t", " True "] {
            assert!(parse_bool(Some(truthy)), "{truthy} should be true");
        }
        for falsy in ["false", "0", "no", "", "maybe"] {
            assert!(!parse_bool(Some(falsy)), "{falsy} should be false");
        }
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_parse_level_defaults() {
        assert_eq!(parse_level(None, LevelRule::Clamp), DEFAULT_LEVEL);
        assert_eq!(parse_level(Some(""), LevelRule::Clamp), DEFAULT_LEVEL);
        assert_eq!(parse_level(Some("abc"), LevelRule::Clamp), DEFAULT_LEVEL);
        assert_eq!(parse_level(Some("2.5"), LevelRule::RemapFive), DEFAULT_LEVEL);
    }

    #[test]
    fn test_parse_level_always_in_range() {
        let inputs = [
            "-100",
            "0",
            "1",
            "2",
            "3",
            "4",
            "5",
            "6",
            "9",
            " 3 ",
            "+2",
            "99999999999999999999999",
            "-99999999999999999999999",
        ];
        for input in inputs {
            for rule in [LevelRule::Clamp, LevelRule::RemapFive] {
                let level = parse_level(Some(input), rule);
                assert!(
                    (MIN_LEVEL..=MAX_LEVEL).contains(&level),
                    "{input} -> {level} out of range"
                );
            }
        }
        assert_eq!(parse_level(Some("-100"), LevelRule::Clamp), 1);
        assert_eq!(parse_level(Some("9"), LevelRule::Clamp), 4);
        assert_eq!(parse_level(Some(" 3 "), LevelRule::Clamp), 3);
        assert_eq!(parse_level(Some("-99999999999999999999999"), LevelRule::Clamp), 1);
    }

    #[test]
    fn test_parse_level_remap_five() {
        assert_eq!(parse_level(Some("5"), LevelRule::RemapFive), 4);
        assert_eq!(parse_level(Some("5"), LevelRule::Clamp), 4);
        assert_eq!(parse_level(Some("2"), LevelRule::RemapFive), 2);
    }

    #[test]
    fn test_parse_optional_int() {
        assert_eq!(parse_optional_int(None), Ok(None));
        assert_eq!(parse_optional_int(Some(" ")), Ok(None));
        assert_eq!(parse_optional_int(Some(" 42 ")), Ok(Some(42)));
        let err = parse_optional_int(Some("forty")).unwrap_err();
        assert_eq!(err.value, "forty");
        assert!(err.to_string().contains("forty"));
    }

    #[test]
    fn test_parse_id_or() {
        assert_eq!(parse_id_or(Some("17"), 99), 17);
        assert_eq!(parse_id_or(Some(""), 99), 99);
        assert_eq!(parse_id_or(Some("x17"), 99), 99);
        assert_eq!(parse_id_or(None, 99), 99);
    }
}
