use log::debug;

use crate::{
    bind::BoundTable,
    error::{LoadError, LoadResult},
    schema::Schema,
};

/// Drops rows missing any row-required field. Returns the kept table and the drop count.
pub fn drop_incomplete_rows(table: BoundTable, schema: &Schema) -> LoadResult<(BoundTable, usize)> {
    let required = schema.row_required_fields();
    let before = table.len();
    let kept = table.retain_rows(|table, row| {
        required.iter().all(|field| {
            table
                .cell(row, *field)
                .is_some_and(|cell| !cell.is_blank())
        })
    });
    let dropped = before - kept.len();
    debug!("Dropped {dropped} incomplete row(s) of {before}");

    if kept.is_empty() {
        return Err(LoadError::EmptyResult {
            required: required.iter().map(|f| f.as_str().to_string()).collect(),
            dropped,
        });
    }
    Ok((kept, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bind::bind_headers, grid::RawGrid};

    #[test]
    fn drops_rows_with_blank_required_cells() {
        let schema = Schema::preset("camaras").unwrap();
        let grid = RawGrid::from_text_rows(vec![
            vec!["MARCA", "PRODUCTO", "CAJA APROX", "UBICACION"],
            vec!["Acme", "Widget", "10", "Camara 1"],
            vec!["Acme", "   ", "4", "Camara 1"],
            vec!["Acme", "Gizmo", "", "Camara 2"],
            vec!["Globex", "Gadget", "N/A", "Reefer 3"],
        ]);
        let table = bind_headers(&grid, &schema).unwrap();
        let (kept, dropped) = drop_incomplete_rows(table, &schema).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(
            kept.rows().iter().map(|r| r.source_row).collect::<Vec<_>>(),
            vec![2, 5]
        );
    }

    #[test]
    fn product_and_brand_are_always_required() {
        let mut schema = Schema::preset("cajas").unwrap();
        schema.required_for_rows.clear();
        let grid = RawGrid::from_text_rows(vec![
            vec!["PRODUCTO", "CAJAS", "UNID X CAJA", "MARCA", "UBICACION"],
            vec!["Widget", "1", "2", "", "R1"],
            vec!["Gadget", "1", "2", "Acme", ""],
        ]);
        let table = bind_headers(&grid, &schema).unwrap();
        let (kept, dropped) = drop_incomplete_rows(table, &schema).unwrap();
        assert_eq!(dropped, 1);
        assert_eq!(kept.rows()[0].source_row, 3);
    }

    #[test]
    fn all_rows_without_product_is_empty_result() {
        let schema = Schema::preset("camaras").unwrap();
        let grid = RawGrid::from_text_rows(vec![
            vec!["MARCA", "PRODUCTO", "CAJA APROX", "UBICACION"],
            vec!["Acme", "", "10", "Camara 1"],
            vec!["Globex", "", "3", "Reefer 2"],
        ]);
        let table = bind_headers(&grid, &schema).unwrap();
        let err = drop_incomplete_rows(table, &schema).unwrap_err();
        match err {
            LoadError::EmptyResult { required, dropped } => {
                assert_eq!(dropped, 2);
                assert_eq!(required[0], "product");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
