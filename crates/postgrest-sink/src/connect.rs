use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// PostgREST connection options
#[derive(Clone, Debug)]
pub struct PostgrestOpts {
    /// Project URL, e.g. `http://localhost:54321`
    pub supabase_url: String,
    /// API key sent as both `apikey` and bearer token
    pub supabase_key: String,
}

/// REST base for a project URL: `{url}/rest/v1`.
pub fn rest_base_url(supabase_url: &str) -> String {
    format!("{}/rest/v1", supabase_url.trim().trim_end_matches('/'))
}

/// Headers attached to every request.
///
/// `Prefer: return=representation` asks the store to echo created and
/// updated rows, which is where the inserted count comes from.
pub(crate) fn default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "apikey",
        HeaderValue::from_str(api_key).context("API key is not a valid header value")?,
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .context("API key is not a valid header value")?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    Ok(headers)
}
