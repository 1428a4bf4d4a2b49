// src/ingest.rs
//! Comma-separated text to [`Dataset`].
//!
//! The format is plain: the first non-blank line is the header, values are
//! split on every comma and there is no quoting or escaping.

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

use crate::core::{Cell, Dataset, PredictError, Result};

/// Rejects uploads that are not CSV by MIME type or extension.
pub fn check_upload(filename: &str, content_type: Option<&str>) -> Result<()> {
    let is_csv_mime = content_type.map_or(false, |t| t.eq_ignore_ascii_case("text/csv"));
    let is_csv_name = filename.to_ascii_lowercase().ends_with(".csv");
    if is_csv_mime || is_csv_name {
        Ok(())
    } else {
        Err(PredictError::parse("Please upload a CSV file"))
    }
}

/// Parses delimited text into a dataset whose target is the last column.
pub fn ingest(filename: &str, raw_text: &str) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(raw_text.as_bytes());

    // Leading blank lines are skipped; the header is the first line with content.
    let mut records = reader.records();
    let mut headers: Vec<String> = Vec::new();
    for record in records.by_ref() {
        let record = record?;
        if !is_blank(&record) {
            headers = record.iter().map(str::to_string).collect();
            break;
        }
    }
    if headers.iter().all(String::is_empty) {
        return Err(PredictError::parse(format!(
            "{}: no header columns found",
            filename
        )));
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        rows.push(record.iter().map(Cell::parse).collect::<Vec<_>>());
    }

    let dataset = Dataset::from_records(filename, &headers, rows);
    debug!(
        "ingested {}: {} rows, {} columns, target {:?}",
        filename,
        dataset.len(),
        dataset.columns().len(),
        dataset.target()
    );
    Ok(dataset)
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(str::is_empty)
}
