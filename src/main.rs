use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::{ConfigLoader, PayrollConfig};

/// Serve the payroll engine over HTTP.
///
/// Without `--config` the built-in Angolan schedule is used.
#[derive(Parser, Debug)]
#[command(name = "payroll-engine")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing schedule.yaml and irt_brackets.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(dir) => ConfigLoader::load(dir)
            .with_context(|| format!("Failed to load configuration from: {}", dir.display()))?
            .into_config(),
        None => PayrollConfig::angola_default(),
    };

    info!(
        schedule = %config.schedule().code,
        brackets = config.brackets().len(),
        "Using payroll schedule"
    );

    let router = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind: {}", args.bind))?;

    info!(address = %args.bind, "Payroll engine listening");

    axum::serve(listener, router)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
