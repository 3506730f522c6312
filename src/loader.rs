//! The load pipeline: bytes and a schema in, an immutable record set out.
//!
//! Stages run strictly in order and each returns a fresh value:
//! raw parse, header binding with schema validation, row cleaning, type
//! coercion, and `total_units` derivation. Any stage failure ends the load
//! with a [`LoadError`]; no partial record set is ever returned.

use log::debug;
use serde::Serialize;

use crate::{
    bind::bind_headers,
    clean::drop_incomplete_rows,
    coerce::{CoercionKind, CoercionWarning, coerce_rows},
    derive::derive_records,
    error::{LoadError, LoadResult},
    grid::{ParseOptions, RawGrid, parse_grid},
    record::RecordSet,
    schema::Schema,
};

/// What the pipeline discarded or defaulted on the way to the record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_dropped_incomplete: usize,
    pub rows_dropped_invalid_date: usize,
    pub warnings: Vec<CoercionWarning>,
}

impl LoadReport {
    pub fn numeric_coercions(&self) -> usize {
        self.count(CoercionKind::NumericDefaulted)
    }

    pub fn date_rejections(&self) -> usize {
        self.count(CoercionKind::DateRejected)
    }

    fn count(&self, kind: CoercionKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

#[derive(Debug, Clone)]
pub struct Loader<'a> {
    schema: &'a Schema,
    options: ParseOptions,
}

impl<'a> Loader<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn load(&self, bytes: &[u8]) -> LoadResult<RecordSet> {
        self.load_with_report(bytes).map(|(records, _)| records)
    }

    pub fn load_with_report(&self, bytes: &[u8]) -> LoadResult<(RecordSet, LoadReport)> {
        self.schema.validate()?;
        let grid = parse_grid(bytes, &self.options)?;
        self.run_stages(&grid)
    }

    /// Runs every stage after raw parsing against an already-built grid.
    pub fn load_grid(&self, grid: &RawGrid) -> LoadResult<(RecordSet, LoadReport)> {
        self.schema.validate()?;
        self.run_stages(grid)
    }

    fn run_stages(&self, grid: &RawGrid) -> LoadResult<(RecordSet, LoadReport)> {
        let bound = bind_headers(grid, self.schema)?;
        let rows_read = bound.len();
        let (cleaned, rows_dropped_incomplete) = drop_incomplete_rows(bound, self.schema)?;
        let (typed, warnings) = coerce_rows(&cleaned);
        let records = RecordSet::new(derive_records(typed, &self.schema.derivation));

        let rows_dropped_invalid_date = warnings
            .iter()
            .filter(|w| w.kind == CoercionKind::DateRejected)
            .count();
        debug!(
            "Loaded {} record(s) from {} row(s) using schema {}",
            records.len(),
            rows_read,
            self.schema.name.as_deref().unwrap_or("<custom>")
        );
        let report = LoadReport {
            rows_read,
            rows_dropped_incomplete,
            rows_dropped_invalid_date,
            warnings,
        };
        Ok((records, report))
    }
}

/// Loads `bytes` with default parse options (format sniffed, comma, UTF-8, first sheet).
pub fn load(bytes: &[u8], schema: &Schema) -> Result<RecordSet, LoadError> {
    Loader::new(schema).load(bytes)
}
