pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod parsers;
pub mod plugin_api;
pub mod state;
pub mod status;
pub mod units;
pub mod watchers;

#[cfg(test)]
mod test_support;

use clap::Parser;
use error::AppError;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<(), AppError> {
    let cli = cli::Cli::parse();
    let config = cli.load_config()?;
    init_tracing(&config.log.level);

    tracing::debug!("Using plugin API at {}", config.api.base_url);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(cli::execute(cli.command, config))
}
