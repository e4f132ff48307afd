//! HTTP/HTTPS file reader implementation

use anyhow::{Context, Result};

/// Reads a file from HTTP/HTTPS
pub struct HttpFileReader;

impl HttpFileReader {
    /// Fetch an HTTP or HTTPS URL and return a sync-compatible reader
    ///
    /// Non-success statuses are errors.
    pub async fn open(url: String) -> Result<Box<dyn std::io::Read + Send>> {
        let client = reqwest::Client::new();

        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP request failed with status {status} for URL: {url}");
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from: {url}"))?;

        tracing::debug!("Fetched {} bytes from: {}", bytes.len(), url);

        Ok(Box::new(std::io::Cursor::new(bytes)))
    }
}
