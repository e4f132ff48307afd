//! Core types for the supabase-sync framework.
//!
//! This crate provides the foundational types shared by the import pipeline:
//!
//! - [`Table`] - The three target collections, in dependency order
//! - [`Role`], [`User`], [`Task`] - Strictly-typed records sent to the store
//! - [`Record`] - Trait tying a record type to its table and primary key
//! - [`SourceRow`] - One loosely-typed CSV row with its source line number
//! - [`Normalized`] - Tagged result of converting a row into a record
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── csv-types      (field coercion from raw CSV text)
//!    ├─── rest-sink      (RestSink trait + batch upsert client)
//!    ├─── postgrest-sink (reqwest-backed RestSink)
//!    └─── csv-source     (row provider, normalizer, resolver, aggregator)
//! ```

pub mod records;
pub mod row;
pub mod table;

pub use records::{
    Record, RecordId, Role, Task, User, DEFAULT_LEVEL, DEFAULT_ROLE_COLOR, DEFAULT_ROLE_ICON,
    DEFAULT_TASK_STATUS, MAX_LEVEL, MIN_LEVEL,
};
pub use row::{Normalized, SkipReason, SourceRow};
pub use table::Table;
