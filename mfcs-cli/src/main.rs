use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mfcs_core::call::CallFamily;
use mfcs_core::settings::{Settings, SettingsManager};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod stream;

#[derive(Parser, Debug)]
#[command(name = "mfcs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract calls from model output and correlate their results")]
struct Args {
    /// Load settings from a specific file instead of ~/.mfcs/settings.toml
    #[arg(long, value_name = "PATH", global = true)]
    settings_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a complete response and print its calls as JSON
    Parse {
        /// File holding the response; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Run one turn over line delimited JSON on stdin/stdout
    Stream,
    /// Print the calling prompt for a JSON capability group list
    Prompt {
        #[arg(long, default_value = "tool")]
        family: CallFamily,
        /// JSON file with the capability groups; stdin when omitted
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings_path = match args.settings_path {
        Some(path) => path,
        None => SettingsManager::default_settings_path()?,
    };
    let settings_manager = SettingsManager::from_path(settings_path)?;
    let settings = settings_manager.settings().clone();

    setup_tracing(&settings)?;
    info!(settings = ?settings_manager.path(), command = ?args.command, "CLI startup");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args.command, settings))
}

async fn async_main(command: Command, settings: Settings) -> Result<()> {
    match command {
        Command::Parse { file } => commands::parse(file, &settings).await,
        Command::Stream => stream::run_stream(&settings).await,
        Command::Prompt { family, file } => commands::prompt(family, file, &settings).await,
    }
}

fn setup_tracing(settings: &Settings) -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    // stdout carries the protocol, so logs always go to a file
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    let trace_dir = home.join(".mfcs").join("trace");
    fs::create_dir_all(&trace_dir)
        .with_context(|| format!("Failed to create trace directory {trace_dir:?}"))?;

    let log_file = trace_dir.join("mfcs.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {log_file:?}"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
