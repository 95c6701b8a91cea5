use anyhow::{Context, Result};
use clap::Parser;
use job_board::cli::{handle_command, Cli};
use job_board::config::{AppConfig, API_KEY_VAR};
use std::fs::OpenOptions;
use tracing::{info, warn};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("job_board=info,jobofficer=info,rocket::server=off")),
        )
        .init();

    info!(
        "Loaded configuration for environment: {} ({})",
        AppConfig::get_environment(),
        AppConfig::config_path(cli.config.as_deref()).display()
    );
    if config.api_key.is_none() {
        warn!("{} is not set; AI drafting and scouting will fail", API_KEY_VAR);
    }
    handle_command(cli, config).await
}
