//! CSV type coercions for sync-core records.
//!
//! Every function here takes the raw text of one cell (already looked up by
//! column name, possibly absent) and returns a typed value. Coercions are
//! total wherever the importer has a fallback: malformed input degrades to a
//! default instead of failing the row.
//!
//! # Modules
//!
//! - [`reverse`] - Text, boolean, integer and level coercions
//! - [`date`] - Multi-format date parsing into a canonical `NaiveDate`
//! - [`list`] - JSON-or-comma-list parsing for sequence fields
//!
//! # Example
//!
//! ```
//! use csv_types::{parse_date, parse_int_list, parse_level, LevelRule};
//!
//! assert_eq!(parse_level(Some("9"), LevelRule::Clamp), 4);
//! assert_eq!(parse_int_list(Some("1, 2,3")), vec![1, 2, 3]);
//! assert_eq!(
//!     parse_date(Some("03/09/2024")).map(|d| d.to_string()),
//!     Some("2024-03-09".to_string())
//! );
//! ```

pub mod date;
pub mod list;
pub mod reverse;

pub use date::{parse_date, DATE_FORMATS, DATETIME_FORMATS};
pub use list::{parse_int_list, parse_json_list};
pub use reverse::{
    parse_bool, parse_id_or, parse_level, parse_optional_int, text, CsvParseError, LevelRule,
};
