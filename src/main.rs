//! pricewatch binary: argument parsing, logging setup, config overrides

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pricewatch::app::{self, Command};
use pricewatch::config::{Config, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(version, about = "Product price monitor with Telegram alerts")]
struct Args {
    /// Path to config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Price history file (overrides config)
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Seconds between price checks (overrides config)
    #[arg(long)]
    interval: Option<u64>,

    /// Telegram chat to alert (overrides config and environment)
    #[arg(long)]
    chat_id: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    // Priority: CLI args > environment > config file > defaults
    let mut cfg = Config::from_file(&args.config)?;
    cfg.apply_env(|key| std::env::var(key).ok());

    if let Some(data_file) = args.data_file {
        cfg.storage.data_file = data_file;
    }
    if let Some(interval) = args.interval {
        cfg.monitor.check_interval_secs = interval;
    }
    if let Some(chat_id) = args.chat_id {
        cfg.telegram.chat_id = Some(chat_id);
    }

    app::run(cfg, args.command.unwrap_or(Command::Run)).await
}
