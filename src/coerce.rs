//! Type coercion stage.
//!
//! Quantities are parse-or-zero: anything that is not a non-negative number
//! becomes `0` and is recorded as a warning. Expiration dates are
//! parse-or-drop: a non-empty cell that is not a date removes the row.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::{
    bind::{BoundRow, BoundTable},
    data::{CellValue, excel_serial_to_date, parse_calendar_date},
    field::Field,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    /// A quantity cell could not be read and was set to zero.
    NumericDefaulted,
    /// A date cell could not be read and its row was dropped.
    DateRejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionWarning {
    pub row: usize,
    pub field: Field,
    pub value: String,
    pub kind: CoercionKind,
}

/// A cleaned row with typed values, before `total_units` is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRow {
    pub source_row: usize,
    pub product: String,
    pub brand: String,
    pub location: Option<String>,
    pub boxes_available: u64,
    pub units_per_box: Option<u64>,
    pub loose_units: Option<u64>,
    pub expiration_date: Option<NaiveDate>,
}

pub fn coerce_rows(table: &BoundTable) -> (Vec<TypedRow>, Vec<CoercionWarning>) {
    let mut warnings = Vec::new();
    let rows = table
        .rows()
        .iter()
        .filter_map(|row| coerce_row(table, row, &mut warnings))
        .collect::<Vec<_>>();
    debug!(
        "Coerced {} row(s) with {} warning(s)",
        rows.len(),
        warnings.len()
    );
    (rows, warnings)
}

fn coerce_row(
    table: &BoundTable,
    row: &BoundRow,
    warnings: &mut Vec<CoercionWarning>,
) -> Option<TypedRow> {
    let text = |field: Field| {
        table
            .cell(row, field)
            .and_then(|cell| cell.as_text())
            .map(|value| value.into_owned())
    };

    let expiration_date = match table.cell(row, Field::ExpirationDate) {
        Some(cell) => match coerce_date(cell) {
            Ok(date) => date,
            Err(_) => {
                warnings.push(warning(row, Field::ExpirationDate, cell, CoercionKind::DateRejected));
                return None;
            }
        },
        None => None,
    };

    let mut quantity = |field: Field| -> Option<u64> {
        let cell = table.cell(row, field)?;
        match parse_quantity(cell) {
            Some(value) => Some(value),
            None => {
                warnings.push(warning(row, field, cell, CoercionKind::NumericDefaulted));
                Some(0)
            }
        }
    };

    let boxes_available = quantity(Field::BoxesAvailable).unwrap_or(0);
    let units_per_box = quantity(Field::UnitsPerBox);
    let loose_units = quantity(Field::LooseUnits);

    Some(TypedRow {
        source_row: row.source_row,
        product: text(Field::Product).unwrap_or_default(),
        brand: text(Field::Brand).unwrap_or_default(),
        location: text(Field::Location),
        boxes_available,
        units_per_box,
        loose_units,
        expiration_date,
    })
}

fn warning(row: &BoundRow, field: Field, cell: &CellValue, kind: CoercionKind) -> CoercionWarning {
    CoercionWarning {
        row: row.source_row,
        field,
        value: cell.as_text().map(|v| v.into_owned()).unwrap_or_default(),
        kind,
    }
}

/// Reads a non-negative whole quantity. Blank cells are `Some(0)`; `None` means unreadable.
pub fn parse_quantity(cell: &CellValue) -> Option<u64> {
    match cell {
        CellValue::Empty => Some(0),
        CellValue::Number(n) => whole_quantity(*n),
        CellValue::Bool(b) => Some(u64::from(*b)),
        CellValue::Date(_) => None,
        CellValue::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Some(0);
            }
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_quantity))
        }
    }
}

// Fractions truncate toward zero.
fn whole_quantity(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}

/// Reads an optional calendar date. Blank cells are `Ok(None)`.
pub fn coerce_date(cell: &CellValue) -> Result<Option<NaiveDate>> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Date(date) => Ok(Some(*date)),
        CellValue::Number(serial) => match excel_serial_to_date(*serial) {
            Some(date) => Ok(Some(date)),
            None => bail!("'{serial}' is not a spreadsheet date serial"),
        },
        CellValue::Bool(b) => bail!("'{b}' is not a date"),
        CellValue::Text(raw) => {
            if raw.trim().is_empty() {
                return Ok(None);
            }
            parse_calendar_date(raw).map(Some)
        }
    }
}
