//! Source-specific import handlers.
//!
//! - `csv`: role, user and task CSV import into Supabase

pub mod csv;
