//! The operations exposed to the request layer.
//!
//! `read_and_resample` runs ingest, projection, normalization and
//! resampling on one file. `cut` and `save` are re-exported from their
//! modules. Nothing here keeps state between calls.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::ingest::read_tsv;
use crate::normalize::normalize;
use crate::project::drop_columns;
use crate::resample::{resample, GroupingConfig, GroupingRequest};
use crate::series::Series;

pub use crate::cut::cut;
pub use crate::serialize::save;

/// Reads `path`, drops `drop`, normalizes timestamps and resamples.
pub fn read_and_resample<S: AsRef<str>>(
    path: &Path,
    drop: &[S],
    grouping: &GroupingConfig,
) -> Result<Series> {
    let raw = read_tsv(path)?;
    let projected = drop_columns(&raw, drop);
    let normalized = normalize(&projected)?;
    let resampled = resample(&normalized, grouping)?;
    log::info!(
        "{}: {} rows in, {} rows out ({})",
        path.display(),
        raw.len(),
        resampled.len(),
        grouping.name()
    );
    Ok(resampled)
}

/// Body of a sensor-data request.
///
/// ```json
/// {
///   "filepath": "20250415150255.tsv",
///   "colsToDrop": ["DeviceName", "Version()", "Battery level(%)"],
///   "config": { "groupMethod": "seconds_passed" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataRequest {
    pub filepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols_to_drop: Option<Vec<String>>,
    #[serde(default)]
    pub config: GroupingRequest,
}

/// Resolves and runs a sensor-data request against `engine`.
pub fn handle_sensor_data(engine: &EngineConfig, request: &SensorDataRequest) -> Result<Series> {
    let grouping = request.config.to_config()?;
    let path = engine.resolve_input(&request.filepath)?;
    let drop = request
        .cols_to_drop
        .as_deref()
        .unwrap_or(engine.drop_columns.as_slice());
    read_and_resample(&path, drop, &grouping)
}
