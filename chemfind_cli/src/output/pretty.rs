//! Terminal formatting for records and source listings.

use chemfind_core::{CandidateRecord, SourceInfo};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde_json::Value;

const NAME_WIDTH: usize = 40;

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let headers: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h.cyan().bold().to_string()))
        .collect();
    table.set_header(headers);
    table
}

fn dash() -> String {
    "-".dimmed().to_string()
}

fn opt(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => truncate_str(v, NAME_WIDTH),
        _ => dash(),
    }
}

fn confidence_cell(confidence: f64) -> String {
    let text = format!("{:.2}", confidence);
    if confidence >= 0.8 {
        text.green().to_string()
    } else if confidence >= 0.5 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

pub fn format_records_table(records: &[CandidateRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n", "No results.".dimmed());
    }

    let mut table = base_table(&["#", "Name", "CAS", "Formula", "MW", "Source", "Conf."]);
    for (i, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new((i + 1).to_string()),
            Cell::new(truncate_str(&record.name, NAME_WIDTH)),
            Cell::new(opt(record.cas_number.as_deref())),
            Cell::new(opt(record.molecular_formula.as_deref())),
            Cell::new(
                record
                    .molecular_weight
                    .map(|w| format!("{:.2}", w))
                    .unwrap_or_else(dash),
            ),
            Cell::new(format!("{}:{}", record.source, record.source_id)),
            Cell::new(confidence_cell(record.confidence)),
        ]);
    }

    let mut output = table.to_string();
    output.push('\n');
    output
}

pub fn format_sources_table(sources: &[SourceInfo]) -> String {
    let mut table = base_table(&["Source", "Status", "Confidence", "Description"]);
    for source in sources {
        let status = if source.configured {
            "ready".green().to_string()
        } else {
            "not configured".yellow().to_string()
        };
        table.add_row(vec![
            Cell::new(source.name.bold().to_string()),
            Cell::new(status),
            Cell::new(format!("{:.2}", source.baseline_confidence)),
            Cell::new(&source.description),
        ]);
    }
    let mut output = table.to_string();
    output.push('\n');
    output
}

/// Card layout for a single record.
pub fn format_record(record: &CandidateRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", record.name.bold()));
    out.push_str(&format!(
        "   {} {}:{}  {} {}\n",
        "source".dimmed(),
        record.source.green(),
        record.source_id,
        "confidence".dimmed(),
        confidence_cell(record.confidence)
    ));

    let mut field = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            out.push_str(&format!("   {:<14} {}\n", label.dimmed(), value));
        }
    };
    field("chemical name", record.chemical_name.clone());
    field("CAS", record.cas_number.clone());
    field("formula", record.molecular_formula.clone());
    field("mol. weight", record.molecular_weight.map(|w| format!("{:.3}", w)));
    field("manufacturer", record.manufacturer.clone());

    if let Some(properties) = &record.properties {
        let mut keys: Vec<&String> = properties.keys().collect();
        keys.sort();
        for key in keys {
            out.push_str(&format!(
                "   {:<14} {}\n",
                key.dimmed(),
                format_scalar(&properties[key])
            ));
        }
    }

    if let Some(synonyms) = &record.synonyms {
        if !synonyms.is_empty() {
            let shown: Vec<&str> = synonyms.iter().take(8).map(String::as_str).collect();
            let more = synonyms.len().saturating_sub(shown.len());
            let mut line = shown.join(", ");
            if more > 0 {
                line.push_str(&format!(" (+{} more)", more));
            }
            out.push_str(&format!("   {:<14} {}\n", "synonyms".dimmed(), line));
        }
    }
    out
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::Null => dash(),
        Value::Number(n) => n.yellow().to_string(),
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn truncate_str(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or(s);
    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
