use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use tracing::debug;

/// One CSV data row, keyed by header name.
pub type Record = IndexMap<String, String>;

pub async fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read CSV file {}", path.display()))?;

    parse_records(&content)
        .with_context(|| format!("Failed to parse CSV file {}", path.display()))
}

pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?.clone();

    let records = reader
        .records()
        .enumerate()
        .map(|(index, row)| -> Result<Record> {
            let row = row.with_context(|| format!("Malformed CSV row {}", index + 1))?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect())
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} records with columns {:?}", records.len(), headers);
    Ok(records)
}
