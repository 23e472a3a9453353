pub mod config;
pub mod details;
pub mod replace;
pub mod search;
pub mod sources;

use crate::cli::Cli;
use chemfind_core::config::ChemfindConfig;
use chemfind_core::ExternalProductService;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown source '{0}' (expected one of: {1})")]
    UnknownSource(String, String),

    #[error("Nothing found for {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] chemfind_core::error::ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] chemfind_core::error::SourceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

pub fn load_config(cli: &Cli) -> Result<ChemfindConfig> {
    Ok(ChemfindConfig::load(cli.config.as_deref())?)
}

pub fn build_service(cli: &Cli) -> Result<ExternalProductService> {
    let config = load_config(cli)?;
    tracing::debug!(
        cache = %config.cache_path().display(),
        chemspider_key = config.chemspider.api_key.is_some(),
        "building product service"
    );
    Ok(ExternalProductService::from_config(&config)?)
}

/// Spinner on stderr; hidden for machine-readable output.
pub fn spinner(cli: &Cli, message: String) -> ProgressBar {
    if cli.output != crate::cli::OutputFormat::Pretty {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
