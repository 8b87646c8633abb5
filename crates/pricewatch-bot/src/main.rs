//! Market price notification daemon - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Market price notification daemon
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PRICEWATCH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// Log rendered notices instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    pricewatch_telemetry::init_logging()?;

    info!("Starting pricewatch v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > PRICEWATCH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("PRICEWATCH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = pricewatch_bot::AppConfig::load(&config_path)?;
    if args.dry_run {
        config.validate_settings()?;
    } else {
        config.validate()?;
    }
    info!(
        symbols = config.feed.symbols.len(),
        channels = config.enabled_channels().count(),
        dry_run = args.dry_run,
        "Configuration loaded"
    );

    let app = pricewatch_bot::Application::new(config, args.dry_run)?;

    if args.once {
        app.run_once().await?;
    } else {
        app.run().await?;
    }

    Ok(())
}
