//! Episub - WebVTT to SRT batch conversion and episode consistency checks
//!
//! Entry point for the `episub` binary: parses arguments, sets up logging,
//! loads configuration and dispatches to the workflow.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use episub::cli::Args;
use episub::config::Config;
use episub::error::EpisubError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<EpisubError>() {
                Some(err @ EpisubError::InvalidInputDirectory(_)) => eprintln!("{}", err),
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    // Keep the file writer flushing until the run ends
    let _guard = setup_logging(args.verbose)?;
    info!("Starting episub");

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let status = args.command.execute(config, &mut std::io::stdout().lock()).await?;

    info!("episub finished: {:?}", status);
    Ok(status.into())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".episub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation; the guard flushes on drop
    let file_appender = rolling::daily(&log_dir, "episub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Reports go to stdout, so the console layer stays on stderr
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(LevelFilter::from_level(log_level).into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("episub.log").display());

    Ok(guard)
}
