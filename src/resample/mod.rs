//! Resampling strategies.
//!
//! Two families, selected by [`GroupingConfig`]:
//!
//! - **Fixed-rate interpolation** ([`interpolate`]): a new, evenly spaced
//!   `elapsed_seconds` axis at `hz` samples per second, numeric columns
//!   linearly interpolated between the bracketing source rows. Used to get one
//!   sample per video frame.
//! - **Block aggregation** ([`aggregate`]): consecutive rows collapsed into
//!   one, either `n` at a time or by identical `elapsed_seconds`. Within each
//!   group, a column whose values all parse as finite numbers is averaged;
//!   any other column keeps the group's first value.
//!
//! Interpolation detects numeric columns once for the whole series with
//! [`detect_numeric_columns`] and coerces them up front with
//! [`coerce_numeric`]. Aggregation decides per group.

pub mod aggregate;
pub mod interpolate;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::series::{Field, Series, ELAPSED_COLUMN};

/// Group size used when a request names `NbyN` without `groupN`.
pub const DEFAULT_GROUP_SIZE: usize = 4;

/// Resampling strategy and its parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupingConfig {
    /// Mean of every `n` consecutive rows.
    FixedCount(usize),
    /// Linear interpolation onto a `hz` samples-per-second axis.
    FixedRate(f64),
    /// Mean of rows sharing the same `elapsed_seconds`.
    TimestampBucket,
    /// Leave the series as it is.
    NoGroup,
}

impl GroupingConfig {
    /// Builds a config from a strategy name.
    ///
    /// Accepted names are the request names (`NbyN`, `seconds_passed`,
    /// `noGroup`, `camera_freq`) and their descriptive aliases
    /// (`fixed_count`, `timestamp_bucket`, `none`, `fixed_rate`).
    pub fn from_name(name: &str, param: Option<f64>) -> Result<Self> {
        let config = match name {
            "NbyN" | "fixed_count" => {
                let n = match param {
                    None => DEFAULT_GROUP_SIZE,
                    Some(value) if value >= 1.0 && value.fract() == 0.0 => value as usize,
                    Some(value) => {
                        return Err(Error::config(format!(
                            "group size must be a positive integer, got {value}"
                        )))
                    }
                };
                GroupingConfig::FixedCount(n)
            }
            "seconds_passed" | "timestamp_bucket" => GroupingConfig::TimestampBucket,
            "noGroup" | "none" => GroupingConfig::NoGroup,
            "camera_freq" | "fixed_rate" => {
                let hz = param.ok_or_else(|| Error::config("fixed rate needs a frequency"))?;
                GroupingConfig::FixedRate(hz)
            }
            other => return Err(Error::config(format!("unknown grouping method {other:?}"))),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            GroupingConfig::FixedCount(0) => Err(Error::config("group size must be at least 1")),
            GroupingConfig::FixedRate(hz) if !(hz.is_finite() && hz > 0.0) => Err(Error::config(
                format!("frequency must be a positive number, got {hz}"),
            )),
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupingConfig::FixedCount(_) => "fixed_count",
            GroupingConfig::FixedRate(_) => "fixed_rate",
            GroupingConfig::TimestampBucket => "timestamp_bucket",
            GroupingConfig::NoGroup => "none",
        }
    }
}

/// Grouping section of a sensor-data request body.
///
/// ```json
/// { "camera_freq": 30 }
/// { "groupMethod": "NbyN", "groupN": 4 }
/// { "groupMethod": "seconds_passed" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingRequest {
    #[serde(default, rename = "camera_freq", skip_serializing_if = "Option::is_none")]
    pub camera_freq: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_n: Option<usize>,
}

impl GroupingRequest {
    /// Resolves the request into a config. A camera frequency wins over any
    /// group method; a request naming neither is rejected.
    pub fn to_config(&self) -> Result<GroupingConfig> {
        if let Some(hz) = self.camera_freq {
            let config = GroupingConfig::FixedRate(hz);
            config.validate()?;
            return Ok(config);
        }
        match self.group_method.as_deref() {
            Some(name) => GroupingConfig::from_name(name, self.group_n.map(|n| n as f64)),
            None => Err(Error::config("no grouping method configured")),
        }
    }
}

/// Columns whose value parses as a finite number in every row.
///
/// Candidates are the first record's columns; a row missing the column
/// disqualifies it. The result is empty for an empty series.
pub fn detect_numeric_columns(series: &Series) -> BTreeSet<String> {
    let Some(first) = series.first() else {
        return BTreeSet::new();
    };
    first
        .columns()
        .filter(|column| {
            series
                .iter()
                .all(|record| record.get(column).and_then(Field::to_number).is_some())
        })
        .map(str::to_string)
        .collect()
}

/// Converts the text values of `columns` into numbers, in a single pass.
pub fn coerce_numeric(series: &Series, columns: &BTreeSet<String>) -> Series {
    series
        .iter()
        .map(|record| {
            let mut record = record.clone();
            for (column, field) in record.iter_mut() {
                if !columns.contains(column) {
                    continue;
                }
                if let Field::Text(_) = field {
                    if let Some(value) = field.to_number() {
                        *field = Field::Number(value);
                    }
                }
            }
            record
        })
        .collect()
}

/// Applies `config` to a normalized series and returns the new series.
pub fn resample(series: &Series, config: &GroupingConfig) -> Result<Series> {
    config.validate()?;
    if let GroupingConfig::NoGroup = config {
        return Ok(series.clone());
    }

    let resampled = match *config {
        GroupingConfig::FixedRate(hz) => {
            let numeric = detect_numeric_columns(series);
            log::debug!("interpolating {} numeric columns", numeric.len());
            interpolate::to_fixed_rate(&coerce_numeric(series, &numeric), &numeric, hz)?
        }
        GroupingConfig::FixedCount(n) => aggregate::by_count(series, n),
        GroupingConfig::TimestampBucket => aggregate::by_timestamp(series)?,
        GroupingConfig::NoGroup => series.clone(),
    };
    log::debug!(
        "resampled {} rows into {} ({})",
        series.len(),
        resampled.len(),
        config.name()
    );
    Ok(resampled)
}

/// Per-row `elapsed_seconds`, failing on the first row that lacks it.
pub(crate) fn elapsed_axis(series: &Series) -> Result<Vec<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(row, record)| {
            record.elapsed().ok_or_else(|| Error::Schema {
                row,
                message: format!("missing numeric {ELAPSED_COLUMN}"),
            })
        })
        .collect()
}
