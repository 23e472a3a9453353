use crate::cli::Cli;
use crate::commands::{build_service, spinner, CommandError, Result};
use crate::output::{format_output, OutputData};

pub async fn run(cli: &Cli, source: &str, id: &str) -> Result<()> {
    let service = build_service(cli)?;

    let known: Vec<String> = service.sources().into_iter().map(|s| s.name).collect();
    if !known.iter().any(|name| name.eq_ignore_ascii_case(source)) {
        return Err(CommandError::UnknownSource(source.to_string(), known.join(", ")));
    }

    let progress = spinner(cli, format!("Fetching {} record {}...", source, id));
    let record = service.get_product_details(id, source).await;
    progress.finish_and_clear();

    match record {
        Some(record) => format_output(&OutputData::Record(record), &cli.output),
        None => Err(CommandError::NotFound(format!("{} record '{}'", source, id))),
    }
}
