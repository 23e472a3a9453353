use crate::cli::{Cli, ConfigAction};
use crate::commands::{load_config, Result};
use crate::output::{format_output, OutputData};
use chemfind_core::config::ChemfindConfig;
use owo_colors::OwoColorize;
use serde_json::Value;

pub async fn run(cli: &Cli, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Init { force } => init_config(cli, *force),
    }
}

fn config_path(cli: &Cli) -> std::path::PathBuf {
    cli.config.clone().unwrap_or_else(ChemfindConfig::default_path)
}

/// Keep the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn show_config(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    config.chemspider.api_key = config.chemspider.api_key.as_deref().map(mask);

    let mut value = serde_json::to_value(&config)?;
    if let Value::Object(map) = &mut value {
        map.insert(
            "config_path".to_string(),
            Value::String(config_path(cli).display().to_string()),
        );
        map.insert(
            "cache_path".to_string(),
            Value::String(config.cache_path().display().to_string()),
        );
    }
    format_output(&OutputData::Config(value), &cli.output)
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        println!(
            "{} {} (use --force to overwrite)",
            "Config already exists:".yellow(),
            path.display()
        );
        return Ok(());
    }
    ChemfindConfig::default().save_to(&path)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}
