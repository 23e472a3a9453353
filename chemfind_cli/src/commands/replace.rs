use crate::cli::{Cli, ReplaceArgs};
use crate::commands::{build_service, spinner, CommandError, Result};
use crate::output::{format_output, OutputData};
use chemfind_core::{NumericRange, OriginalProduct, ReplacementCriteria};

fn to_request(args: &ReplaceArgs) -> Result<(OriginalProduct, ReplacementCriteria)> {
    if let (Some(min), Some(max)) = (args.mw_min, args.mw_max) {
        if min > max {
            return Err(CommandError::InvalidInput(format!(
                "--mw-min ({}) is greater than --mw-max ({})",
                min, max
            )));
        }
    }

    let original = OriginalProduct {
        name: args.name.clone(),
        chemical_name: args.chemical_name.clone(),
        cas_number: args.cas.clone(),
        category: args.category.clone(),
    };
    let criteria = ReplacementCriteria {
        chemical_class: args.chemical_class.clone(),
        functional_groups: args.functional_groups.clone(),
        molecular_weight_range: NumericRange::new(args.mw_min, args.mw_max),
        safety_profile: args.safety_profile.clone(),
        excluded_substances: args.excluded_substances.clone(),
        ..ReplacementCriteria::default()
    };
    Ok((original, criteria))
}

pub async fn run(cli: &Cli, args: &ReplaceArgs) -> Result<()> {
    let (original, criteria) = to_request(args)?;
    if chemfind_core::aggregator::replacement_queries(&original, &criteria).is_empty() {
        return Err(CommandError::InvalidInput(
            "give at least one of --chemical-name, --cas, --category, --class or --group"
                .to_string(),
        ));
    }

    let service = build_service(cli)?;
    let progress = spinner(cli, "Searching for replacements...".to_string());
    let records = service
        .find_replacements(&original, &criteria, args.max)
        .await;
    progress.finish_and_clear();

    format_output(
        &OutputData::Replacements {
            original,
            criteria,
            records,
        },
        &cli.output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> ReplaceArgs {
        let cli = Cli::parse_from(args);
        match cli.command {
            Commands::Replace(args) => args,
            _ => panic!("expected replace"),
        }
    }

    #[test]
    fn test_args_to_request() {
        let args = parse(&[
            "chemfind",
            "replace",
            "--chemical-name",
            "toluene",
            "--class",
            "ester",
            "--group",
            "hydroxyl",
            "--group",
            "carbonyl",
            "--exclude",
            "toluene",
            "--mw-min",
            "80",
            "--mw-max",
            "120",
        ]);
        let (original, criteria) = to_request(&args).unwrap();
        assert_eq!(original.chemical_name.as_deref(), Some("toluene"));
        assert_eq!(criteria.chemical_class.as_deref(), Some("ester"));
        assert_eq!(criteria.functional_groups, vec!["hydroxyl", "carbonyl"]);
        assert_eq!(criteria.excluded_substances, vec!["toluene"]);
        assert!(criteria.molecular_weight_range.contains(92.14));
        assert_eq!(args.max, 10);
    }

    #[test]
    fn test_inverted_weight_range_rejected() {
        let args = parse(&["chemfind", "replace", "--cas", "108-88-3", "--mw-min", "200", "--mw-max", "100"]);
        assert!(matches!(to_request(&args), Err(CommandError::InvalidInput(_))));
    }
}
