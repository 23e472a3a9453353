use crate::cli::Cli;
use crate::commands::{build_service, Result};
use crate::output::{format_output, OutputData};

pub async fn run(cli: &Cli) -> Result<()> {
    let service = build_service(cli)?;
    format_output(&OutputData::Sources(service.sources()), &cli.output)
}
