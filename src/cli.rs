use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::config::Config;
use crate::error::{EpisubError, Result};
use crate::workflow::Workflow;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every WebVTT file in a directory to SRT, filed by show
    Convert {
        /// Directory containing the subtitle files
        input_dir: PathBuf,

        /// Output directory (default: <input_dir>/out)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Write all files directly into the output directory
        #[arg(long)]
        flat: bool,

        /// Replace output files that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Report season/episode numbering gaps per show
    Check {
        /// Directory containing the subtitle files
        input_dir: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Write the default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "config.toml")]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One line per anomaly
    Text,
    /// JSON array of anomalies
    Json,
}

/// How a command ended, before it becomes a process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    ConversionFailures,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::ConversionFailures => ExitCode::FAILURE,
        }
    }
}

impl Commands {
    /// Run the command with a resolved configuration, writing reports to `out`.
    ///
    /// Anomalies found by `check` are findings and still exit successfully;
    /// a conversion run with any failed file does not.
    pub async fn execute<W: Write>(self, mut config: Config, out: &mut W) -> Result<RunStatus> {
        match self {
            Commands::Convert { input_dir, output_dir, flat, overwrite } => {
                info!("Converting subtitles in: {}", input_dir.display());

                config.convert.flat |= flat;
                config.convert.overwrite |= overwrite;

                let workflow = Workflow::new(config)?;
                let summary = workflow.convert_directory(&input_dir, output_dir.as_ref()).await?;

                writeln!(
                    out,
                    "Converted {}, skipped {}, failed {} of {} files",
                    summary.converted, summary.skipped, summary.failed, summary.found
                )?;
                if summary.failed > 0 {
                    return Ok(RunStatus::ConversionFailures);
                }
            }
            Commands::Check { input_dir, format } => {
                info!("Checking episode sequence in: {}", input_dir.display());

                let workflow = Workflow::new(config)?;
                let anomalies = workflow.check_directory(&input_dir)?;

                match format {
                    ReportFormat::Text => {
                        for anomaly in &anomalies {
                            writeln!(out, "{}", anomaly)?;
                        }
                    }
                    ReportFormat::Json => {
                        writeln!(out, "{}", serde_json::to_string_pretty(&anomalies)?)?;
                    }
                }
            }
            Commands::InitConfig { path } => {
                if path.exists() {
                    return Err(EpisubError::Config(format!(
                        "{} already exists, not overwriting",
                        path.display()
                    )));
                }
                Config::default().save_to_file(&path)?;
                writeln!(out, "Wrote default configuration to {}", path.display())?;
            }
        }

        Ok(RunStatus::Success)
    }
}
