//! File source abstraction for reading CSV input from the local filesystem
//! or HTTP/HTTPS.
//!
//! The import pipeline only needs a byte stream per table; where the bytes
//! come from is decided here and nowhere else.
//!
//! # Source Types
//!
//! - **Local**: A file on the local filesystem
//! - **HTTP/HTTPS**: A single URL fetched with a GET request
//!
//! # Example
//!
//! ```ignore
//! use supabase_sync_file::FileSource;
//!
//! let source = FileSource::parse("./roles_rows.csv")?;
//! let reader = source.open().await?;
//! // Hand reader to the CSV row provider...
//! ```

mod http;
mod local;

use anyhow::Result;
use std::path::PathBuf;

pub use http::HttpFileReader;
pub use local::LocalFileReader;

/// A single readable file location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Local filesystem path
    Local(PathBuf),
    /// HTTP/HTTPS URL
    Http(String),
}

impl FileSource {
    /// Parse a string into a FileSource, auto-detecting the source type
    ///
    /// - `http://` or `https://` -> Http
    /// - Everything else -> Local
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            anyhow::bail!("Source path must not be empty");
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            Ok(FileSource::Http(uri.to_string()))
        } else {
            Ok(FileSource::Local(PathBuf::from(uri)))
        }
    }

    /// Open this source and return a reader over its full contents
    pub async fn open(&self) -> Result<Box<dyn std::io::Read + Send>> {
        match self {
            FileSource::Local(path) => LocalFileReader::open(path.clone()).await,
            FileSource::Http(url) => HttpFileReader::open(url.clone()).await,
        }
    }

    /// Get a display name for logging
    pub fn display_name(&self) -> String {
        match self {
            FileSource::Local(path) => path.display().to_string(),
            FileSource::Http(url) => url.clone(),
        }
    }
}

impl std::str::FromStr for FileSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileSource::parse(s)
    }
}
