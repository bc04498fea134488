//! celebration-rsvp server.
//!
//! Usage:
//!   celebration-rsvp serve
//!   celebration-rsvp serve --in-memory
//!   celebration-rsvp check-config

use std::sync::Arc;

use anyhow::Result;
use celebration_rsvp::{build_sheet_client, config::Config, http::start_http_server};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "celebration-rsvp")]
#[command(about = "Invitation site API backed by spreadsheet proxies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Keep sheets in memory instead of calling the proxy scripts
        #[arg(long)]
        in_memory: bool,
    },
    /// Print the resolved configuration with secrets redacted
    CheckConfig,
}

const DEFAULT_LOG_FILTER: &str = "celebration_rsvp=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Before Config::load so its warnings are not dropped.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    match cli.command.unwrap_or(Commands::Serve { in_memory: false }) {
        Commands::Serve { in_memory } => {
            info!("Starting celebration-rsvp v{}", env!("CARGO_PKG_VERSION"));
            let sheets = build_sheet_client(&config, in_memory)?;
            start_http_server(Arc::new(config), sheets).await
        }
        Commands::CheckConfig => {
            print!("{}", config.describe());
            Ok(())
        }
    }
}
