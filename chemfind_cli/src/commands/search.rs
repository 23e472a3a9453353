use crate::cli::Cli;
use crate::commands::{build_service, spinner, CommandError, Result};
use crate::output::{format_output, OutputData};

/// Run an aggregated search across all configured sources.
pub async fn run(cli: &Cli, query: &str, limit: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(CommandError::InvalidInput(
            "Missing search query. Usage: chemfind search \"<query>\"".to_string(),
        ));
    }

    let service = build_service(cli)?;
    let progress = spinner(cli, format!("Searching for '{}'...", query));
    let report = service.search_with_report(query, limit).await;
    progress.finish_and_clear();

    format_output(&OutputData::Search(report), &cli.output)
}
