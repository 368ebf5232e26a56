//! Engine configuration.
//!
//! Only filesystem locations and the default drop list live here; the
//! resampling strategy is never part of it and is passed with each call.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Columns dropped when a request does not name its own list.
pub const DEFAULT_DROP_COLUMNS: [&str; 3] = ["DeviceName", "Version()", "Battery level(%)"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory request file paths are resolved against.
    /// Default: `./public/data`
    pub data_dir: PathBuf,

    /// Directory exported cuts are written to.
    /// Default: `./public/data`
    pub export_dir: PathBuf,

    /// Columns removed before normalization when a request gives none.
    /// Default: device name, firmware version and battery level.
    pub drop_columns: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./public/data"),
            export_dir: PathBuf::from("./public/data"),
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    /// Loads a JSON config file; absent keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Resolves a request file path under `data_dir`. Absolute paths and
    /// paths that climb out with `..` are rejected.
    pub fn resolve_input(&self, filepath: &str) -> Result<PathBuf> {
        Ok(self.data_dir.join(relative(filepath)?))
    }

    /// Export stem for `name` under `export_dir`.
    pub fn export_stem(&self, name: &str) -> Result<PathBuf> {
        Ok(self.export_dir.join(relative(name)?))
    }
}

fn relative(path: &str) -> Result<&Path> {
    let candidate = Path::new(path);
    let escapes = candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.is_empty() || escapes {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("path {path:?} must stay inside the configured directory"),
        )));
    }
    Ok(candidate)
}
