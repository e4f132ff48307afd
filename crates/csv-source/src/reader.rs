//! Source row provider.
//!
//! Turns the raw bytes of a delimited text file into [`SourceRow`]s: strips
//! a leading UTF-8 byte-order mark, sniffs the delimiter, and maps each data
//! row onto the header's column names.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;
use supabase_sync_file::FileSource;
use sync_core::SourceRow;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Number of leading bytes inspected when sniffing the delimiter.
pub const SNIFF_SAMPLE_LEN: usize = 1024;

/// Delimiters considered by [`sniff_delimiter`], in tie-break order.
pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Remove a leading UTF-8 byte-order mark, if present.
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Guess the delimiter from the start of a file.
///
/// A candidate wins when it appears the same non-zero number of times
/// (outside double quotes) on every complete line of the sample. The
/// trailing line is ignored when the sample was cut short, since it is
/// probably partial. Falls back to `,`.
pub fn sniff_delimiter(sample: &[u8], truncated: bool) -> u8 {
    let text = String::from_utf8_lossy(sample);
    let mut lines: Vec<&str> = text.lines().collect();
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    let lines: Vec<&str> = lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return b',';
    }

    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .find(|&delimiter| {
            let first = count_unquoted(lines[0], delimiter);
            first > 0
                && lines
                    .iter()
                    .all(|line| count_unquoted(line, delimiter) == first)
        })
        .unwrap_or(b',')
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Parse delimited text into rows keyed by the header's column names.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<SourceRow>> {
    let bytes = strip_bom(bytes);
    let sample_len = bytes.len().min(SNIFF_SAMPLE_LEN);
    let delimiter = sniff_delimiter(&bytes[..sample_len], bytes.len() > SNIFF_SAMPLE_LEN);
    debug!("Using delimiter {:?}", delimiter as char);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    debug!("CSV headers/columns: {headers:?}");

    let mut rows = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();

        rows.push(SourceRow::new(line, fields));
    }

    Ok(rows)
}

/// Read every row from `source`.
pub async fn read_source(source: &FileSource) -> Result<Vec<SourceRow>> {
    let mut reader = source
        .open()
        .await
        .with_context(|| format!("Failed to open CSV source: {}", source.display_name()))?;

    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read CSV source: {}", source.display_name()))?;

    read_rows(&bytes).with_context(|| format!("Failed to parse CSV: {}", source.display_name()))
}
