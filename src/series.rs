//! In-memory model of a sensor recording.
//!
//! A [`Series`] is an ordered list of [`Record`]s, each an ordered map from
//! column name to [`Field`]. Ingest produces text-only fields; later stages
//! replace them with numbers and timestamps and always return a new series.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::PrimitiveDateTime;

/// Column holding the absolute sample timestamp.
pub const TIME_COLUMN: &str = "time";

/// Column holding seconds since the first sample, added by normalization.
pub const ELAPSED_COLUMN: &str = "elapsed_seconds";

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Raw text exactly as it appeared in the source.
    Text(String),
    Number(f64),
    /// Millisecond-precision wall clock instant, no offset.
    Time(PrimitiveDateTime),
}

impl Field {
    pub fn text(value: impl Into<String>) -> Self {
        Field::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Field::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<PrimitiveDateTime> {
        match self {
            Field::Time(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric reading of the field: numbers as-is, text when it parses as a
    /// finite float. Timestamps are never numeric.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Field::Number(value) => Some(*value),
            Field::Text(raw) => raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Field::Time(_) => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Text(raw) => f.write_str(raw),
            Field::Number(value) => write!(f, "{value}"),
            Field::Time(ts) => f.write_str(&format_timestamp(*ts)),
        }
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Number(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Text(raw) => serializer.serialize_str(raw),
            Field::Number(value) => serializer.serialize_f64(*value),
            Field::Time(ts) => serializer.serialize_str(&format_timestamp(*ts)),
        }
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(f64),
            Text(String),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Number(value) => Field::Number(value),
            Wire::Text(raw) => Field::Text(raw),
        })
    }
}

/// Renders a timestamp in the canonical `YYYY-MM-DD HH:MM:SS:mmm` form.
pub fn format_timestamp(ts: PrimitiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}:{:03}",
        ts.year(),
        ts.month() as u8,
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.millisecond()
    )
}

/// One row: column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Field> {
        self.fields.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Sets a column. A new column goes last; an existing one keeps its slot.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Field>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Removes a column, keeping the order of the rest.
    pub fn remove(&mut self, column: &str) -> Option<Field> {
        self.fields.shift_remove(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Field)> {
        self.fields.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `elapsed_seconds` of this row, if the row has been normalized.
    pub fn elapsed(&self) -> Option<f64> {
        self.get(ELAPSED_COLUMN).and_then(Field::as_number)
    }

    /// True when both records hold the same set of columns, in any order.
    pub fn same_columns(&self, other: &Record) -> bool {
        self.len() == other.len() && self.columns().all(|c| other.contains(c))
    }
}

impl<K: Into<String>, V: Into<Field>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Ordered rows of one recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    records: Vec<Record>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Column names of the first record; empty for an empty series.
    pub fn columns(&self) -> Vec<String> {
        self.first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Values of one column as numbers, `None` where a row is missing the
    /// column or holds a non-numeric value.
    pub fn column_values(&self, column: &str) -> Vec<Option<f64>> {
        self.records
            .iter()
            .map(|r| r.get(column).and_then(Field::to_number))
            .collect()
    }
}

impl FromIterator<Record> for Series {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Series {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
