//! Vitals relay - Entry Point
//!
//! `collector` ingests producer telemetry and publishes the current snapshot.
//! `dashboard` polls a collector and renders the rolling view.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use vitals_relay::{config::CONFIG_ENV, shutdown_signal, AppConfig};

/// Vitals telemetry relay
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the telemetry collector
    Collector {
        /// Listen port (overrides PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
        /// Directory of built dashboard assets
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Poll a collector and render the dashboard
    Dashboard {
        /// Collector snapshot URL
        #[arg(long)]
        url: Option<String>,
        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    vitals_telemetry::init_logging()?;

    info!("Starting vitals-relay v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Collector { port, static_dir } => {
            let mut collector = config.collector.with_env_overrides();
            if let Some(port) = port {
                collector.port = port;
            }
            if static_dir.is_some() {
                collector.static_dir = static_dir;
            }
            vitals_relay::run_collector(collector, shutdown_signal()).await?;
        }
        Command::Dashboard { url, interval_ms } => {
            let mut dashboard = config.dashboard;
            if let Some(url) = url {
                dashboard.url = url;
            }
            if let Some(interval_ms) = interval_ms {
                dashboard.poll_interval_ms = interval_ms;
            }
            vitals_relay::run_dashboard(dashboard, shutdown_signal()).await?;
        }
    }

    Ok(())
}
