//! Raw parse stage: spreadsheet bytes to a headerless grid of cells.
//!
//! Two payload formats are understood. XLSX workbooks are read with
//! `calamine` straight from memory; anything else is treated as delimited
//! text and read with the `csv` crate. Row 0 of the grid is whatever the
//! sheet's first row holds; the binding stage decides what to do with it.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use clap::ValueEnum;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::{CellValue, excel_serial_to_date},
    error::{LoadError, LoadResult},
    io_utils,
};

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum PayloadFormat {
    #[default]
    Auto,
    Csv,
    Xlsx,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub format: PayloadFormat,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    /// Worksheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            format: PayloadFormat::Auto,
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            sheet: None,
        }
    }
}

/// Rows x columns of untyped cells with a uniform width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl RawGrid {
    /// Builds a grid, padding short rows with empty cells.
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self { rows, width }
    }

    /// Convenience constructor for text-only grids.
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(CellValue::text).collect())
                .collect(),
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

pub fn detect_format(bytes: &[u8]) -> PayloadFormat {
    if bytes.starts_with(ZIP_SIGNATURE) {
        PayloadFormat::Xlsx
    } else {
        PayloadFormat::Csv
    }
}

pub fn parse_grid(bytes: &[u8], options: &ParseOptions) -> LoadResult<RawGrid> {
    if bytes.is_empty() {
        return Err(LoadError::parse("payload is empty"));
    }
    let format = match options.format {
        PayloadFormat::Auto => detect_format(bytes),
        explicit => explicit,
    };
    let grid = match format {
        PayloadFormat::Xlsx => parse_xlsx(bytes, options.sheet.as_deref())?,
        _ => parse_csv(bytes, options.delimiter, options.encoding)?,
    };
    debug!(
        "Parsed {:?} payload into {} row(s) x {} column(s)",
        format,
        grid.height(),
        grid.width()
    );
    Ok(grid)
}

fn parse_csv(bytes: &[u8], delimiter: u8, encoding: &'static Encoding) -> LoadResult<RawGrid> {
    let mut reader = io_utils::open_csv_reader(bytes, delimiter);
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|err| LoadError::parse(format!("row {}: {err}", idx + 1)))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .map_err(|err| LoadError::parse(format!("row {}: {err}", idx + 1)))?;
        rows.push(decoded.into_iter().map(CellValue::text).collect());
    }
    Ok(RawGrid::from_rows(rows))
}

fn parse_xlsx(bytes: &[u8], sheet: Option<&str>) -> LoadResult<RawGrid> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|err| LoadError::parse(format!("not an XLSX workbook: {err}")))?;
    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .map_err(|err| LoadError::parse(format!("reading sheet '{name}': {err}")))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoadError::parse("workbook has no sheets"))?
            .map_err(|err| LoadError::parse(format!("reading first sheet: {err}")))?,
    };
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawGrid::from_rows(rows))
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
