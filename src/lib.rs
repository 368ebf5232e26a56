//! Sensor recording alignment and resampling.
//!
//! Turns an irregularly sampled, tab-separated sensor recording into a series
//! on an `elapsed_seconds` axis, resampled either to a fixed frame rate or by
//! block aggregation, and cuts and exports sub-ranges of it.
//!
//! ```no_run
//! use std::path::Path;
//! use sensorsync::{cut, read_and_resample, save, GroupingConfig};
//!
//! let series = read_and_resample(
//!     Path::new("public/data/20250415150255.tsv"),
//!     &["DeviceName", "Version()", "Battery level(%)"],
//!     &GroupingConfig::FixedRate(30.0),
//! )?;
//! let clip = cut(&series, 12.0, 18.5);
//! save(&clip, Path::new("public/data/20250415150255"));
//! # Ok::<(), sensorsync::Error>(())
//! ```

pub mod config;
pub mod cut;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod project;
pub mod resample;
pub mod serialize;
pub mod series;

pub use config::EngineConfig;
pub use cut::TimeWindow;
pub use error::{Error, Result};
pub use pipeline::{cut, handle_sensor_data, read_and_resample, save, SensorDataRequest};
pub use resample::{detect_numeric_columns, resample, GroupingConfig, GroupingRequest};
pub use series::{Field, Record, Series, ELAPSED_COLUMN, TIME_COLUMN};
