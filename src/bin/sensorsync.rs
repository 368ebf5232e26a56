use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use sensorsync::{
    cut, handle_sensor_data, read_and_resample, save, EngineConfig, GroupingConfig,
    SensorDataRequest, Series, TimeWindow,
};

#[derive(Parser)]
#[command(name = "sensorsync")]
#[command(about = "Align sensor recordings to a video timeline and export cuts")]
struct Cli {
    /// Engine config (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a TSV recording and resample it, printing the series as JSON
    Resample {
        /// Input TSV path
        #[arg(long)]
        input: PathBuf,

        /// Column to drop (repeatable). The configured drop list is used when none is given
        #[arg(long = "drop")]
        drop: Vec<String>,

        /// Grouping method: NbyN, seconds_passed, noGroup or camera_freq
        #[arg(long)]
        method: String,

        /// Group size for NbyN, frequency in Hz for camera_freq
        #[arg(long)]
        param: Option<f64>,

        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a sensor-data request body (JSON) against the configured data directory
    Request {
        /// Request body path
        #[arg(long)]
        body: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Cut a JSON series to [start, end] seconds and re-zero it
    Cut {
        /// Series JSON path
        #[arg(long)]
        series: PathBuf,

        #[arg(long)]
        start: f64,

        #[arg(long)]
        end: f64,

        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Cut a JSON series and save it as a timestamped TSV in the export directory
    Export {
        /// Series JSON path
        #[arg(long)]
        series: PathBuf,

        #[arg(long)]
        start: f64,

        #[arg(long)]
        end: f64,

        /// File name stem, relative to the export directory
        #[arg(long)]
        stem: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let engine = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Resample {
            input,
            drop,
            method,
            param,
            output,
        } => {
            let grouping = GroupingConfig::from_name(&method, param)?;
            let drop = if drop.is_empty() {
                engine.drop_columns.clone()
            } else {
                drop
            };
            let series = read_and_resample(&input, &drop, &grouping)
                .with_context(|| format!("process {}", input.display()))?;
            write_json(&series, output.as_deref())?;
        }
        Commands::Request { body, output } => {
            let data = std::fs::read(&body).with_context(|| format!("read {}", body.display()))?;
            let request: SensorDataRequest =
                serde_json::from_slice(&data).context("parse request body")?;
            let series = handle_sensor_data(&engine, &request)
                .with_context(|| format!("process {}", request.filepath))?;
            write_json(&series, output.as_deref())?;
        }
        Commands::Cut {
            series,
            start,
            end,
            output,
        } => {
            let input = read_json(&series)?;
            let clip = cut(&input, start, end);
            write_json(&clip, output.as_deref())?;
        }
        Commands::Export {
            series,
            start,
            end,
            stem,
        } => {
            let window = TimeWindow::new(start, end);
            if !window.is_valid() {
                bail!("start ({start}) must be before end ({end})");
            }
            let input = read_json(&series)?;
            let clip = cut(&input, start, end);
            if clip.is_empty() {
                bail!("no samples between {start}s and {end}s");
            }
            let stem = engine.export_stem(&stem)?;
            if !save(&clip, &stem) {
                bail!("export of {} failed", stem.display());
            }
            info!("exported {} rows", clip.len());
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<Series> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("parse series {}", path.display()))
}

fn write_json(series: &Series, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, series)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer(&mut writer, series)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
