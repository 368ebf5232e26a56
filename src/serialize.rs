//! Tab-separated output, the inverse of [`crate::ingest::parse`].

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::series::Series;

/// Renders a series as tab-separated text with a header line.
///
/// Column order is taken from the first record; every record must have the
/// same column set. An empty series renders as an empty string.
pub fn serialize(series: &Series) -> Result<String> {
    let Some(first) = series.first() else {
        return Ok(String::new());
    };
    let header: Vec<&str> = first.columns().collect();

    let mut tsv = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    tsv.write_record(&header)?;

    for (row, record) in series.iter().enumerate() {
        if !record.same_columns(first) {
            return Err(Error::Schema {
                row,
                message: format!(
                    "expected columns {:?}, found {:?}",
                    header,
                    record.columns().collect::<Vec<_>>()
                ),
            });
        }
        let values: Vec<String> = header
            .iter()
            .map(|column| record.get(column).map(ToString::to_string).unwrap_or_default())
            .collect();
        tsv.write_record(&values)?;
    }

    let bytes = tsv.into_inner().map_err(|err| Error::Io(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Serializes and writes a series to `path` through a temporary file, so a
/// failed write never leaves a truncated file at the destination.
pub fn write_tsv(series: &Series, path: &Path) -> Result<()> {
    let text = serialize(series)?;
    let tmp = tmp_path_for(path)?;
    let _ = std::fs::remove_file(&tmp);

    let mut output = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    output.write_all(text.as_bytes())?;
    output.sync_all()?;
    drop(output);

    std::fs::rename(&tmp, path)?;
    log::debug!("wrote {} rows to {}", series.len(), path.display());
    Ok(())
}

/// Destination for an exported cut:
/// `<stem>_cortado_<DD>_<MM>_<YYYY>_<HH>h_<MM>m_<SS>s.tsv`.
pub fn export_path(stem: &Path, at: OffsetDateTime) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(format!(
        "_cortado_{:02}_{:02}_{:04}_{:02}h_{:02}m_{:02}s.tsv",
        at.day(),
        at.month() as u8,
        at.year(),
        at.hour(),
        at.minute(),
        at.second()
    ));
    PathBuf::from(name)
}

/// Writes `series` to the export path for `stem` at time `at`.
pub fn save_at(series: &Series, stem: &Path, at: OffsetDateTime) -> Result<PathBuf> {
    let path = export_path(stem, at);
    write_tsv(series, &path)?;
    Ok(path)
}

/// Writes `series` next to `stem` with a local-time suffix. Failures are
/// logged and reported as `false`.
pub fn save(series: &Series, stem: &Path) -> bool {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    match save_at(series, stem, now) {
        Ok(path) => {
            log::info!("saved {} rows to {}", series.len(), path.display());
            true
        }
        Err(err) => {
            log::error!("failed to save {}: {err}", stem.display());
            false
        }
    }
}

fn tmp_path_for(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("missing filename for {}", path.display()),
            )
        })?
        .to_string_lossy();
    Ok(path.with_file_name(format!("{name}.tmp")))
}
