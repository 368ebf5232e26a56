//! Tab-separated row ingest.
//!
//! Values are kept verbatim as [`Field::Text`]; typing happens later, once.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{Error, Result};
use crate::series::{Field, Record, Series};

/// Parses tab-separated text with a header line into a series.
pub fn parse(text: &str) -> Result<Series> {
    from_reader(text.as_bytes())
}

/// Reads and parses a tab-separated file. The handle is dropped before return.
pub fn read_tsv(path: impl AsRef<Path>) -> Result<Series> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let series = from_reader(file)?;
    log::debug!("read {} rows from {}", series.len(), path.display());
    Ok(series)
}

pub fn from_reader<R: Read>(reader: R) -> Result<Series> {
    let mut tsv = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = tsv.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::parse(1, "empty input"));
    }
    if headers.iter().all(str::is_empty) {
        return Err(Error::parse(1, "header has no column names"));
    }

    let mut records = Vec::new();
    for row in tsv.records() {
        let row = row?;
        records.push(to_record(&headers, &row)?);
    }
    Ok(Series::from_records(records))
}

fn to_record(headers: &StringRecord, row: &StringRecord) -> Result<Record> {
    if row.len() > headers.len() && row.iter().skip(headers.len()).any(|v| !v.is_empty()) {
        let line = row.position().map(|pos| pos.line()).unwrap_or(0);
        return Err(Error::parse(
            line,
            format!("{} fields for {} columns", row.len(), headers.len()),
        ));
    }

    let mut record = Record::with_capacity(headers.len());
    for (idx, column) in headers.iter().enumerate() {
        let value = row.get(idx).unwrap_or("");
        record.insert(column, Field::text(value));
    }
    Ok(record)
}
