use std::path::Path;

use anyhow::{Context, Result, ensure};
use log::info;

use crate::{
    aggregate,
    cli::{LoadArgs, OutputFormat},
    field::{Field, FieldKind},
    filter, io_utils,
    loader::LoadReport,
    record::RecordSet,
    source,
    table::{self, Align},
};

pub fn execute(args: &LoadArgs) -> Result<()> {
    let inventory = source::load_inventory(&args.source)?;
    let criteria = filter::criteria_from_args(&args.filters)?;
    let mut records = filter::filter(&inventory.records, &criteria);

    if let Some(field) = args.sort {
        ensure!(
            field.is_summable(),
            "Cannot rank by '{field}': only quantity fields can be ranked"
        );
        records = aggregate::ranked_records(&records, field);
    }
    if let Some(limit) = args.limit {
        records = records.into_vec().into_iter().take(limit).collect();
    }

    let fields = inventory.schema.record_fields();
    match args.format {
        OutputFormat::Table => {
            let (headers, rows) = tabulate(&records, &fields);
            let rendered = table::render_aligned_table(&headers, &rows, &alignments(&fields));
            io_utils::write_text(args.output.as_deref(), &rendered)?;
        }
        OutputFormat::Csv => write_csv(&records, &fields, args.output.as_deref())?,
        OutputFormat::Json => io_utils::write_json(args.output.as_deref(), &records)?,
    }

    if args.report {
        print_report(&inventory.report);
    }
    info!(
        "Emitted {} of {} record(s)",
        records.len(),
        inventory.records.len()
    );
    Ok(())
}

pub fn tabulate(records: &RecordSet, fields: &[Field]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = fields.iter().map(|f| f.to_string()).collect();
    let rows = records.iter().map(|r| r.cells(fields)).collect();
    (headers, rows)
}

pub fn alignments(fields: &[Field]) -> Vec<Align> {
    fields
        .iter()
        .map(|field| match field.kind() {
            FieldKind::Quantity | FieldKind::Derived => Align::Right,
            _ => Align::Left,
        })
        .collect()
}

fn write_csv(records: &RecordSet, fields: &[Field], output: Option<&Path>) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(output, io_utils::DEFAULT_CSV_DELIMITER)?;
    let (headers, rows) = tabulate(records, fields);
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush().context("Flushing CSV output")?;
    Ok(())
}

fn print_report(report: &LoadReport) {
    eprintln!("rows read: {}", report.rows_read);
    eprintln!("rows dropped (missing values): {}", report.rows_dropped_incomplete);
    eprintln!("rows dropped (invalid date): {}", report.rows_dropped_invalid_date);
    eprintln!("quantities defaulted to 0: {}", report.numeric_coercions());
    for warning in &report.warnings {
        eprintln!(
            "  row {} {}: '{}' ({:?})",
            warning.row, warning.field, warning.value, warning.kind
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InventoryRecord;

    #[test]
    fn tabulate_renders_missing_values_as_empty_cells() {
        let records = RecordSet::new(vec![InventoryRecord {
            product: "Widget".to_string(),
            brand: "Acme".to_string(),
            location: None,
            boxes_available: 3,
            units_per_box: None,
            loose_units: None,
            expiration_date: None,
            total_units: 3,
        }]);
        let fields = [Field::Product, Field::Location, Field::TotalUnits];
        let (headers, rows) = tabulate(&records, &fields);
        assert_eq!(headers, vec!["product", "location", "total_units"]);
        assert_eq!(rows, vec![vec!["Widget", "", "3"]]);
        assert_eq!(alignments(&fields), vec![Align::Left, Align::Left, Align::Right]);
    }
}
