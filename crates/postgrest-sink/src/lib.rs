//! PostgREST sink for supabase-sync.
//!
//! Implements [`rest_sink::RestSink`] against a Supabase project's REST
//! endpoint (`{url}/rest/v1`). Bulk creates `POST` a JSON array to the
//! collection, updates `PATCH` a single row selected with `id=eq.{id}`, and
//! existence checks `GET` with the same filter.

mod connect;
mod sink_impl;

pub use connect::{rest_base_url, PostgrestOpts};
pub use sink_impl::PostgrestSink;
