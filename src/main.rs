mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::mine::{self, MineArgs};
use crate::config::{AppConfig, DEFAULT_SETTINGS_FILE};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::tfs::TfsConnector;
use crate::infra::xlsx::XlsxExporter;

#[derive(Parser)]
#[command(
    name = "tfs-miner",
    author,
    version,
    about = "Correlates TFS changesets with work items and exports a change report"
)]
struct Cli {
    /// Path to the settings file.
    #[arg(short, long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine the configured branches and save the spreadsheet report.
    Mine(MineArgs),
    /// Inspect or edit the settings file.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command, &cli.settings).await,
        Commands::Mine(args) => run_mine(&cli.settings, args).await,
    }
}

async fn run_mine(settings: &Path, args: MineArgs) -> AppResult<()> {
    let config = AppConfig::load(settings)?;

    if config.credentials.token.is_none() {
        eprintln!("Warning: no access token configured; the server may reject requests.");
    }

    let connector = Arc::new(TfsConnector::new(&config));
    let exporter = Arc::new(XlsxExporter::new());
    let context = AppContext::new(config, connector, exporter);

    let path = mine::run(context, args).await?;
    println!("report saved to {}", path.display());

    Ok(())
}
