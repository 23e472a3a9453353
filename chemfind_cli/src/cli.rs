use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chemfind")]
#[command(about = "chemfind - search external chemical databases for products and substitutes")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  chemfind sources                         List data sources and whether they are usable
  chemfind search acetone                  Search every source for a compound
  chemfind details pubchem 180             Full record for PubChem CID 180
  chemfind replace --chemical-name toluene --class ester --exclude toluene

\x1b[1;36mConfiguration:\x1b[0m
  chemfind config init                     Write a default config file
  chemfind config show                     Show the effective configuration
  CHEMSPIDER_API_KEY=...                   Enables the ChemSpider source")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Path to config file (defaults to ~/.config/chemfind/config.toml)
    #[arg(long, global = true, env = "CHEMFIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every source for a compound or product name
    ///
    /// Results are deduplicated, ranked by confidence and cached for 24 hours.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  chemfind search acetone
  chemfind search \"acetic acid\" --limit 5
  chemfind search ethanol --output json")]
    Search {
        /// Compound or product name
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Suggest replacement products ranked against criteria
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  chemfind replace --name \"Paint Thinner\" --chemical-name toluene --exclude toluene
  chemfind replace --cas 108-88-3 --class ester --mw-min 80 --mw-max 120")]
    Replace(ReplaceArgs),

    /// Fetch full details for one record from its source
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  chemfind details pubchem 180
  chemfind details chemspider 175")]
    Details {
        /// Source name (pubchem, chemspider)
        source: String,
        /// Identifier within the source
        id: String,
    },

    /// List data sources
    Sources,

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Clone, Debug)]
pub struct ReplaceArgs {
    /// Product name of the item being replaced
    #[arg(long, default_value = "")]
    pub name: String,
    /// Chemical name of the item being replaced
    #[arg(long)]
    pub chemical_name: Option<String>,
    /// CAS registry number of the item being replaced
    #[arg(long)]
    pub cas: Option<String>,
    /// Product category
    #[arg(long)]
    pub category: Option<String>,
    /// Preferred chemical class (e.g., ester)
    #[arg(long = "class")]
    pub chemical_class: Option<String>,
    /// Functional group to search for (repeatable)
    #[arg(long = "group")]
    pub functional_groups: Vec<String>,
    /// Minimum molecular weight
    #[arg(long)]
    pub mw_min: Option<f64>,
    /// Maximum molecular weight
    #[arg(long)]
    pub mw_max: Option<f64>,
    /// Required safety profile tag
    #[arg(long)]
    pub safety_profile: Option<String>,
    /// Substance to penalize (repeatable)
    #[arg(long = "exclude")]
    pub excluded_substances: Vec<String>,
    /// Maximum number of suggestions
    #[arg(short, long, default_value_t = 10)]
    pub max: usize,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (API keys masked)
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}
