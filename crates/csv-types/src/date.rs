//! Date parsing for task schedule columns.

use chrono::{NaiveDate, NaiveDateTime};

/// Date-only formats, tried in order. Month-first wins over day-first when
/// both would parse.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

/// The date formats with a time component appended; the time is discarded.
pub const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Parse a date written in any supported format.
///
/// Blank or unparseable input yields `None`.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}
