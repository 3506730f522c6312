//! Header binding and schema validation.
//!
//! The grid's first row is the sheet's own header line. It is discarded in
//! favour of the schema's declared column order, which is then renamed onto
//! canonical names and checked for the columns the schema cannot do without.

use log::debug;

use crate::{
    data::CellValue,
    error::{LoadError, LoadResult},
    field::Field,
    grid::RawGrid,
    schema::Schema,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BoundRow {
    /// 1-based row number in the source sheet.
    pub source_row: usize,
    pub cells: Vec<CellValue>,
}

/// Data rows keyed by canonical column names.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTable {
    columns: Vec<String>,
    rows: Vec<BoundRow>,
}

impl BoundTable {
    pub fn new(columns: Vec<String>, rows: Vec<BoundRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[BoundRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn field_index(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| c == field.as_str())
    }

    pub fn cell<'a>(&self, row: &'a BoundRow, field: Field) -> Option<&'a CellValue> {
        self.field_index(field).and_then(|idx| row.cells.get(idx))
    }

    /// Returns a table with the same columns and only the rows `keep` accepts.
    pub fn retain_rows<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&BoundTable, &BoundRow) -> bool,
    {
        let kept = self
            .rows
            .iter()
            .filter(|row| keep(&self, row))
            .cloned()
            .collect();
        Self {
            columns: self.columns,
            rows: kept,
        }
    }
}

pub fn bind_headers(grid: &RawGrid, schema: &Schema) -> LoadResult<BoundTable> {
    let expected = schema.expected_columns();
    let actual = grid.width();
    if !schema.column_policy.accepts(expected, actual) {
        return Err(LoadError::ColumnCount {
            expected,
            actual,
            policy: schema.column_policy,
        });
    }
    if actual > expected {
        debug!(
            "Ignoring {} trailing column(s) beyond the {} declared",
            actual - expected,
            expected
        );
    }

    let columns = schema.canonical_headers();
    validate_required(&columns, schema)?;

    let rows = grid
        .rows()
        .iter()
        .enumerate()
        .skip(1)
        .map(|(idx, row)| BoundRow {
            source_row: idx + 1,
            cells: row
                .iter()
                .zip(&schema.columns)
                .map(|(cell, column)| column.normalize_cell(cell))
                .collect(),
        })
        .collect::<Vec<_>>();
    debug!(
        "Bound {} data row(s) to columns [{}]",
        rows.len(),
        columns.join(", ")
    );
    Ok(BoundTable::new(columns, rows))
}

pub fn validate_required(columns: &[String], schema: &Schema) -> LoadResult<()> {
    let missing = schema
        .required
        .iter()
        .filter(|field| !columns.iter().any(|c| c == field.as_str()))
        .map(|field| field.as_str().to_string())
        .collect::<Vec<_>>();
    if missing.is_empty() {
        return Ok(());
    }
    Err(LoadError::SchemaMismatch {
        missing,
        mapping: schema.mapping_pairs(),
        resulting: columns.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnPolicy;

    fn camaras_grid() -> RawGrid {
        RawGrid::from_text_rows(vec![
            vec!["MARCA", "PRODUCTO", "CAJA APROX", "UBICACION"],
            vec!["Acme", "Widget", "10", "Camara 1"],
            vec!["Globex", "Gadget", "3", "Reefer 2"],
        ])
    }

    #[test]
    fn binds_canonical_columns_and_skips_header_row() {
        let schema = Schema::preset("camaras").unwrap();
        let table = bind_headers(&camaras_grid(), &schema).expect("bind");
        assert_eq!(
            table.columns(),
            ["brand", "product", "boxes_available", "location"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].source_row, 2);
        let first = &table.rows()[0];
        assert_eq!(
            table.cell(first, Field::Product),
            Some(&CellValue::text("Widget"))
        );
    }

    #[test]
    fn exact_policy_rejects_extra_columns() {
        let schema = Schema::preset("camaras").unwrap();
        let grid = RawGrid::from_text_rows(vec![vec!["MARCA", "PRODUCTO", "CAJA APROX", "UBICACION", "NOTAS"]]);
        let err = bind_headers(&grid, &schema).unwrap_err();
        assert_eq!(
            err,
            LoadError::ColumnCount {
                expected: 4,
                actual: 5,
                policy: ColumnPolicy::Exact
            }
        );
    }

    #[test]
    fn at_least_policy_ignores_trailing_columns() {
        let mut schema = Schema::preset("camaras").unwrap();
        schema.column_policy = ColumnPolicy::AtLeast;
        let grid = RawGrid::from_text_rows(vec![
            vec!["MARCA", "PRODUCTO", "CAJA APROX", "UBICACION", "NOTAS"],
            vec!["Acme", "Widget", "10", "Camara 1", "fragile"],
        ]);
        let table = bind_headers(&grid, &schema).expect("bind");
        assert_eq!(table.columns().len(), 4);
        assert_eq!(table.rows()[0].cells.len(), 4);
    }

    #[test]
    fn missing_mapping_reports_mismatch_diagnostics() {
        let mut schema = Schema::preset("camaras").unwrap();
        schema.mapping.retain(|m| m.from != "UBICACION");
        let err = bind_headers(&camaras_grid(), &schema).unwrap_err();
        match err {
            LoadError::SchemaMismatch {
                missing,
                mapping,
                resulting,
            } => {
                assert_eq!(missing, vec!["location"]);
                assert_eq!(mapping.len(), 3);
                assert_eq!(resulting[3], "UBICACION");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn header_only_grid_binds_no_rows() {
        let schema = Schema::preset("camaras").unwrap();
        let grid = RawGrid::from_text_rows(vec![vec!["MARCA", "PRODUCTO", "CAJA APROX", "UBICACION"]]);
        assert!(bind_headers(&grid, &schema).unwrap().is_empty());
    }

    #[test]
    fn replacements_apply_while_binding() {
        let mut schema = Schema::preset("camaras").unwrap();
        schema.columns[3] = schema.columns[3]
            .clone()
            .with_replacement("Camara 1", "Cámara 1");
        let table = bind_headers(&camaras_grid(), &schema).unwrap();
        let first = &table.rows()[0];
        assert_eq!(
            table.cell(first, Field::Location),
            Some(&CellValue::text("Cámara 1"))
        );
    }
}
