use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "chemfind_cli=info,chemfind_core=warn",
        1 => "chemfind_cli=info,chemfind_core=info",
        _ => "chemfind_cli=debug,chemfind_core=debug",
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Search { query, limit } => search::run(&cli, query, *limit).await,
        Commands::Replace(args) => replace::run(&cli, args).await,
        Commands::Details { source, id } => details::run(&cli, source, id).await,
        Commands::Sources => sources::run(&cli).await,
        Commands::Config { action } => config::run(&cli, action).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}
