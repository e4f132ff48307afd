//! Local filesystem file reader implementation

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Reads a local file into memory
pub struct LocalFileReader;

impl LocalFileReader {
    /// Open a local file and return a sync-compatible reader
    pub async fn open(path: PathBuf) -> Result<Box<dyn std::io::Read + Send>> {
        let contents = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        tracing::debug!("Read {} bytes from: {}", contents.len(), path.display());

        Ok(Box::new(std::io::Cursor::new(contents)))
    }
}
