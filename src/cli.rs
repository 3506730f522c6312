use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    field::{Field, parse_field},
    filter::{ALL_BRANDS, ALL_LOCATIONS, ALL_PRODUCTS},
    grid::PayloadFormat,
};

#[derive(Debug, Parser)]
#[command(
    name = "inventory-normalizer",
    author,
    version,
    about = "Normalize warehouse inventory spreadsheets into canonical records",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a spreadsheet and emit its normalized inventory records
    Load(LoadArgs),
    /// Sum a quantity per distinct value of a grouping field
    Aggregate(AggregateArgs),
    /// Summarize an inventory: top products, totals by brand and by location
    Dashboard(DashboardArgs),
    /// Inspect, export, and validate column schemas
    Schema(SchemaArgs),
}

/// Where the payload comes from and which schema binds it.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input spreadsheet (CSV/TSV or XLSX); use '-' for stdin
    #[arg(
        short = 'i',
        long = "input",
        conflicts_with = "url",
        required_unless_present = "url"
    )]
    pub input: Option<PathBuf>,
    /// Fetch the spreadsheet from an http(s) URL instead of a file
    #[arg(long)]
    pub url: Option<String>,
    /// YAML schema file describing the sheet's columns
    #[arg(short = 's', long = "schema", conflicts_with = "preset")]
    pub schema: Option<PathBuf>,
    /// Built-in schema preset (camaras, cajas, sueltos, vencimientos)
    #[arg(short = 'p', long = "preset")]
    pub preset: Option<String>,
    /// Payload format; auto sniffs XLSX archives and falls back to CSV
    #[arg(long = "input-format", value_enum, default_value = "auto")]
    pub input_format: PayloadFormat,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Worksheet name for XLSX input (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Timeout in seconds for --url downloads
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

/// Equality selectors; "Todas"/"Todos" leave a field unconstrained.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Keep only records of this brand
    #[arg(long, default_value = ALL_BRANDS)]
    pub brand: String,
    /// Keep only records stored at this location
    #[arg(long, default_value = ALL_LOCATIONS)]
    pub location: String,
    /// Keep only records of this product
    #[arg(long, default_value = ALL_PRODUCTS)]
    pub product: String,
    /// Additional equality filters such as `units_per_box=12`
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Rank records by this quantity, highest first
    #[arg(long, value_parser = parse_field)]
    pub sort: Option<Field>,
    /// Limit number of records emitted
    #[arg(long)]
    pub limit: Option<usize>,
    /// Print the load report (dropped rows and coercion warnings) to stderr
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Field to group by
    #[arg(long = "by", value_parser = parse_field)]
    pub by: Field,
    /// Quantity field to sum
    #[arg(long = "sum", value_parser = parse_field, default_value = "total_units")]
    pub sum: Field,
    /// Maximum groups to display (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Number of products in the top list
    #[arg(long, default_value_t = 10)]
    pub top: usize,
    /// Quantity used for ranking and totals
    #[arg(long, value_parser = parse_field, default_value = "total_units")]
    pub measure: Field,
    /// Emit the dashboard as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// List the built-in schema presets
    List,
    /// Print a preset as YAML, optionally writing it to a file
    Show(SchemaShowArgs),
    /// Validate a YAML schema file
    Check(SchemaCheckArgs),
}

#[derive(Debug, Args)]
pub struct SchemaShowArgs {
    /// Preset name
    pub preset: String,
    /// Write the YAML to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SchemaCheckArgs {
    /// YAML schema file to validate
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
