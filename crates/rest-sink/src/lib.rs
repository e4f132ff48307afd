//! REST sink trait abstraction.
//!
//! This crate defines the `RestSink` trait that abstracts over the remote
//! store's REST interface, and the batch upsert client that drives it. The
//! `postgrest-sink` crate implements the trait over HTTP; [`MemorySink`]
//! implements it in memory.
//!
//! The trait works on `serde_json::Value` rows so that implementations stay
//! independent of the record types defined in sync-core.

pub mod memory;
mod traits;
mod upsert;

pub use memory::{MemorySink, SinkCall};
pub use traits::{CreateResponse, RestSink, UpdateResponse};
pub use upsert::{upsert_records, BatchCounts, DEFAULT_BATCH_SIZE};
