//! Resolves a command's payload source and schema, then runs the load pipeline.

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};

use crate::{
    cli::SourceArgs,
    coerce::CoercionKind,
    error::LoadError,
    fetch,
    grid::ParseOptions,
    io_utils,
    loader::{LoadReport, Loader},
    record::RecordSet,
    schema::{DEFAULT_PRESET, Schema},
    table,
};

/// A loaded record set together with what produced it.
#[derive(Debug, Clone)]
pub struct LoadedInventory {
    pub schema: Schema,
    pub records: RecordSet,
    pub report: LoadReport,
    /// SHA-256 of the raw payload bytes.
    pub fingerprint: String,
}

pub fn resolve_schema(args: &SourceArgs) -> Result<Schema> {
    if let Some(path) = &args.schema {
        return Schema::load(path).with_context(|| format!("Loading schema from {path:?}"));
    }
    let name = args.preset.as_deref().unwrap_or(DEFAULT_PRESET);
    Schema::preset(name).ok_or_else(|| {
        anyhow!(
            "Unknown preset '{name}'. Available presets: {}",
            Schema::preset_names().join(", ")
        )
    })
}

pub fn parse_options(args: &SourceArgs) -> Result<ParseOptions> {
    Ok(ParseOptions {
        format: args.input_format,
        delimiter: io_utils::resolve_input_delimiter(args.input.as_deref(), args.delimiter),
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        sheet: args.sheet.clone(),
    })
}

pub fn read_source(args: &SourceArgs) -> Result<Vec<u8>> {
    match (&args.input, &args.url) {
        (Some(path), _) => io_utils::read_payload(path),
        (None, Some(url)) => fetch::fetch_bytes(url, args.timeout),
        (None, None) => Err(anyhow!("Either --input or --url must be provided")),
    }
}

pub fn load_inventory(args: &SourceArgs) -> Result<LoadedInventory> {
    let schema = resolve_schema(args)?;
    let options = parse_options(args)?;
    let bytes = read_source(args)?;
    let fingerprint = io_utils::payload_fingerprint(&bytes);
    debug!("Payload fingerprint sha256:{fingerprint}");

    let (records, report) = match Loader::new(&schema)
        .with_options(options)
        .load_with_report(&bytes)
    {
        Ok(loaded) => loaded,
        Err(err) => {
            log_load_failure(&err);
            return Err(err.into());
        }
    };

    log_report(&report);
    info!(
        "Loaded {} record(s) with schema '{}'",
        records.len(),
        schema.name.as_deref().unwrap_or("custom")
    );
    Ok(LoadedInventory {
        schema,
        records,
        report,
        fingerprint,
    })
}

fn log_load_failure(err: &LoadError) {
    if let LoadError::SchemaMismatch {
        mapping, resulting, ..
    } = err
    {
        let headers = vec!["source column".to_string(), "renamed to".to_string()];
        let rows = mapping
            .iter()
            .map(|(from, to)| vec![from.clone(), to.clone()])
            .collect::<Vec<_>>();
        error!("Column mapping applied:\n{}", table::render_table(&headers, &rows));
        error!("Resulting columns: {}", resulting.join(", "));
    }
}

fn log_report(report: &LoadReport) {
    if report.rows_dropped_incomplete > 0 {
        info!(
            "Dropped {} row(s) missing required values",
            report.rows_dropped_incomplete
        );
    }
    for warning in &report.warnings {
        match warning.kind {
            CoercionKind::NumericDefaulted => debug!(
                "Row {}: '{}' in {} is not a quantity; using 0",
                warning.row, warning.value, warning.field
            ),
            CoercionKind::DateRejected => debug!(
                "Row {}: '{}' in {} is not a date; row dropped",
                warning.row, warning.value, warning.field
            ),
        }
    }
    if report.numeric_coercions() > 0 {
        warn!(
            "{} quantity value(s) could not be read and were set to 0",
            report.numeric_coercions()
        );
    }
    if report.date_rejections() > 0 {
        warn!(
            "{} row(s) dropped because of unreadable expiration dates",
            report.date_rejections()
        );
    }
}
