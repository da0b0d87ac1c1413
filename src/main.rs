//! pairwallet main entry point

use anyhow::Context;
use clap::Parser;
use pairwallet_api::start_server;
use pairwallet_config::{Config, ConfigError};
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "pairwallet")]
#[command(version)]
#[command(
    about = "State server and finance assistant proxy for the PairWallet Mini App",
    long_about = None
)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Defaults are used when the file does not exist; the flag reports that
fn load_config(path: &PathBuf) -> anyhow::Result<(Config, bool)> {
    match Config::load(path) {
        Ok(config) => Ok((config, false)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), true)),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
    }
}

fn init_logging(level: &str) {
    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, defaulted) = load_config(&args.config)?;
    init_logging(&config.logging.level);
    if defaulted {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }

    log::info!(
        "Config loaded: bind={}, data path={}, chat={}",
        config.bind_address(),
        config.data.path.display(),
        if config.chat_enabled() { "on" } else { "off" }
    );

    let rt = Runtime::new().context("Failed to start the async runtime")?;
    rt.block_on(start_server(config))
}
