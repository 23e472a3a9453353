use crate::cli::OutputFormat;
use crate::commands::Result;
use chemfind_core::{AggregateReport, CandidateRecord, OriginalProduct, ReplacementCriteria, SourceInfo};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

mod pretty;
use pretty::{format_record, format_records_table, format_sources_table};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    Search(AggregateReport),
    Replacements {
        original: OriginalProduct,
        criteria: ReplacementCriteria,
        records: Vec<CandidateRecord>,
    },
    Record(CandidateRecord),
    Sources(Vec<SourceInfo>),
    Config(Value),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Pretty => {
            format_pretty_output(data)?;
        }
    }
    Ok(())
}

fn format_pretty_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::Search(report) => {
            let origin = if report.from_cache {
                "(cached)".dimmed().to_string()
            } else {
                match report.duration_ms {
                    Some(ms) => format!("({} ms)", ms).dimmed().to_string(),
                    None => String::new(),
                }
            };
            println!(
                "{} {} {}",
                "Search:".dimmed(),
                report.query.cyan().bold(),
                origin
            );
            println!();
            print!("{}", format_records_table(&report.records));

            if !report.from_cache && report.gathered > report.records.len() {
                println!(
                    "{}",
                    format!(
                        "{} gathered, {} after dedupe and limit",
                        report.gathered,
                        report.records.len()
                    )
                    .dimmed()
                );
            }
            if !report.skipped.is_empty() {
                println!(
                    "{}",
                    format!("skipped (not configured): {}", report.skipped.join(", ")).dimmed()
                );
            }
            for failure in &report.failures {
                println!(
                    "{} {} [{}] {}",
                    "!".yellow().bold(),
                    failure.source.yellow(),
                    failure.code.dimmed(),
                    failure.error
                );
            }
        }
        OutputData::Replacements {
            original, records, ..
        } => {
            let label = if original.name.is_empty() {
                original
                    .chemical_name
                    .clone()
                    .or_else(|| original.cas_number.clone())
                    .unwrap_or_else(|| "product".to_string())
            } else {
                original.name.clone()
            };
            println!(
                "{} {}",
                "Replacements for".dimmed(),
                label.cyan().bold()
            );
            println!();
            print!("{}", format_records_table(records));
        }
        OutputData::Record(record) => {
            print!("{}", format_record(record));
        }
        OutputData::Sources(sources) => {
            println!("{}", "Data Sources".cyan().bold());
            println!();
            print!("{}", format_sources_table(sources));
        }
        OutputData::Config(config) => {
            println!("{}", "Configuration".cyan().bold());
            println!();
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}
