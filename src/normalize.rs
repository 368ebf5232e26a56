//! Timestamp repair and the elapsed-seconds axis.
//!
//! Recorders write the millisecond field without zero padding
//! (`14:33:12:9` means 9 ms), so it is padded to three digits before
//! parsing. Rows are expected in ascending time order; that is not
//! enforced, only reported.

use std::borrow::Cow;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::error::{Error, Result};
use crate::series::{Field, Record, Series, ELAPSED_COLUMN, TIME_COLUMN};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]:[subsecond digits:3]");

/// Left-pads the trailing millisecond field to three digits.
///
/// Only applies when the value has at least four `:`-separated parts;
/// anything else is returned untouched.
pub fn repair_milliseconds(raw: &str) -> Cow<'_, str> {
    if raw.split(':').count() < 4 {
        return Cow::Borrowed(raw);
    }
    match raw.rsplit_once(':') {
        Some((head, millis)) if millis.len() < 3 => Cow::Owned(format!("{head}:{millis:0>3}")),
        _ => Cow::Borrowed(raw),
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS:F` (F being 1-3 digits) after repair.
pub fn parse_timestamp(row: usize, raw: &str) -> Result<PrimitiveDateTime> {
    let repaired = repair_milliseconds(raw);
    PrimitiveDateTime::parse(&repaired, TIMESTAMP_FORMAT).map_err(|_| Error::Format {
        row,
        value: raw.to_string(),
    })
}

/// Replaces `time` with a parsed timestamp and appends `elapsed_seconds`
/// relative to the first row.
pub fn normalize(series: &Series) -> Result<Series> {
    let times = series
        .iter()
        .enumerate()
        .map(|(row, record)| row_time(row, record))
        .collect::<Result<Vec<_>>>()?;

    let Some(&origin) = times.first() else {
        return Ok(Series::new());
    };

    let normalized: Series = series
        .iter()
        .zip(times)
        .map(|(record, ts)| {
            let mut record = record.clone();
            let elapsed_ms = (ts - origin).whole_milliseconds();
            record.insert(TIME_COLUMN, Field::Time(ts));
            record.insert(ELAPSED_COLUMN, Field::Number(elapsed_ms as f64 / 1000.0));
            record
        })
        .collect();

    if let Some(row) = first_regression(&normalized) {
        log::warn!("timestamps go backwards at row {row}; input is not in ascending order");
    }
    log::debug!("normalized {} rows", normalized.len());
    Ok(normalized)
}

fn row_time(row: usize, record: &Record) -> Result<PrimitiveDateTime> {
    match record.get(TIME_COLUMN) {
        Some(Field::Text(raw)) => parse_timestamp(row, raw),
        Some(Field::Time(ts)) => Ok(*ts),
        Some(other) => Err(Error::Format {
            row,
            value: other.to_string(),
        }),
        None => Err(Error::Format {
            row,
            value: String::new(),
        }),
    }
}

/// Index of the first row whose `elapsed_seconds` is lower than its
/// predecessor's, if any.
pub fn first_regression(series: &Series) -> Option<usize> {
    series
        .records()
        .windows(2)
        .position(|pair| match (pair[0].elapsed(), pair[1].elapsed()) {
            (Some(prev), Some(next)) => next < prev,
            _ => false,
        })
        .map(|idx| idx + 1)
}
