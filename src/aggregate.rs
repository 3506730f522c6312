//! Group-by-sum views over a record set.
//!
//! Groups are keyed by exact equality on a field's rendered value and summed
//! over a quantity field. Results are ordered by descending total; ties keep
//! the order in which groups were first seen.

use std::collections::HashMap;

use anyhow::{Result, ensure};
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    cli::{AggregateArgs, OutputFormat},
    field::Field,
    filter::{self, sentinel_for},
    io_utils,
    record::RecordSet,
    source,
    table::{self, Align},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: u64,
}

/// Sums `sum` per distinct `group` value. Records without a `group` value are skipped.
pub fn aggregate_by(records: &RecordSet, group: Field, sum: Field) -> Result<Vec<GroupTotal>> {
    ensure!(
        sum.is_summable(),
        "Cannot sum '{sum}': only quantity fields can be aggregated"
    );
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();
    for record in records {
        let Some(key) = record.display_value(group) else {
            continue;
        };
        let amount = record.quantity(sum).unwrap_or(0);
        match positions.get(&key) {
            Some(&idx) => {
                groups[idx].total = groups[idx].total.saturating_add(amount);
            }
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(GroupTotal { key, total: amount });
            }
        }
    }
    // Stable sort keeps first-seen order for equal totals.
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(groups)
}

pub fn top_n<T>(aggregated: &[T], n: usize) -> &[T] {
    &aggregated[..n.min(aggregated.len())]
}

/// Percentage of the grand total carried by each group; zero when the grand total is zero.
pub fn shares(groups: &[GroupTotal]) -> Vec<f64> {
    let grand_total = groups.iter().map(|g| g.total as f64).sum::<f64>();
    groups
        .iter()
        .map(|g| {
            if grand_total > 0.0 {
                g.total as f64 / grand_total * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Sorted distinct values of `field`, preceded by its "all" sentinel.
pub fn filter_options(records: &RecordSet, field: Field) -> Vec<String> {
    std::iter::once(sentinel_for(field).to_string())
        .chain(
            records
                .iter()
                .filter_map(|r| r.display_value(field))
                .sorted()
                .dedup(),
        )
        .collect()
}

/// Records ordered by descending `field`; ties keep their original order.
pub fn ranked_records(records: &RecordSet, field: Field) -> RecordSet {
    records
        .iter()
        .cloned()
        .sorted_by(|a, b| b.quantity(field).cmp(&a.quantity(field)))
        .collect()
}

pub fn render_rows(groups: &[GroupTotal]) -> Vec<Vec<String>> {
    groups
        .iter()
        .zip(shares(groups))
        .map(|(group, percent)| {
            vec![
                group.key.clone(),
                group.total.to_string(),
                format!("{percent:.2}%"),
            ]
        })
        .collect()
}

pub fn execute(args: &AggregateArgs) -> Result<()> {
    let inventory = source::load_inventory(&args.source)?;
    let criteria = filter::criteria_from_args(&args.filters)?;
    let filtered = filter::filter(&inventory.records, &criteria);
    let groups = aggregate_by(&filtered, args.by, args.sum)?;
    let shown = if args.top > 0 {
        top_n(&groups, args.top)
    } else {
        &groups[..]
    };

    let headers = vec![args.by.to_string(), args.sum.to_string(), "share".to_string()];
    match args.format {
        OutputFormat::Table => {
            let rendered = table::render_aligned_table(
                &headers,
                &render_rows(shown),
                &[Align::Left, Align::Right, Align::Right],
            );
            io_utils::write_text(args.output.as_deref(), &rendered)?;
        }
        OutputFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(
                args.output.as_deref(),
                io_utils::DEFAULT_CSV_DELIMITER,
            )?;
            writer.write_record(&headers)?;
            for row in render_rows(shown) {
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => io_utils::write_json(args.output.as_deref(), shown)?,
    }
    info!(
        "Aggregated {} record(s) into {} group(s) by {}",
        filtered.len(),
        groups.len(),
        args.by
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InventoryRecord;

    fn record(product: &str, brand: &str, location: Option<&str>, total: u64) -> InventoryRecord {
        InventoryRecord {
            product: product.to_string(),
            brand: brand.to_string(),
            location: location.map(str::to_string),
            boxes_available: total,
            units_per_box: None,
            loose_units: None,
            expiration_date: None,
            total_units: total,
        }
    }

    fn sample() -> RecordSet {
        RecordSet::new(vec![
            record("Widget", "ACME", Some("C1"), 5),
            record("Gadget", "Globex", Some("C1"), 9),
            record("Widget", "ACME", Some("R2"), 4),
            record("Gizmo", "Initech", None, 9),
            record("Doohickey", "Hooli", Some("R2"), 0),
        ])
    }

    #[test]
    fn aggregate_sums_and_sorts_descending_with_stable_ties() {
        let groups = aggregate_by(&sample(), Field::Brand, Field::TotalUnits).unwrap();
        let keys = groups.iter().map(|g| (g.key.as_str(), g.total)).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![("ACME", 9), ("Globex", 9), ("Initech", 9), ("Hooli", 0)]
        );
    }

    #[test]
    fn aggregate_skips_records_without_group_value() {
        let groups = aggregate_by(&sample(), Field::Location, Field::TotalUnits).unwrap();
        assert_eq!(
            groups,
            vec![
                GroupTotal { key: "C1".to_string(), total: 14 },
                GroupTotal { key: "R2".to_string(), total: 4 },
            ]
        );
    }

    #[test]
    fn aggregate_rejects_text_sum_field() {
        let err = aggregate_by(&sample(), Field::Brand, Field::Product).unwrap_err();
        assert!(err.to_string().contains("Cannot sum 'product'"));
    }

    #[test]
    fn top_n_truncates_to_available_length() {
        let groups = aggregate_by(&sample(), Field::Product, Field::TotalUnits).unwrap();
        assert_eq!(top_n(&groups, 2).len(), 2);
        assert_eq!(top_n(&groups, 50).len(), groups.len());
        assert!(top_n(&groups, 0).is_empty());
    }

    #[test]
    fn shares_are_percentages_of_grand_total() {
        let groups = vec![
            GroupTotal { key: "a".to_string(), total: 3 },
            GroupTotal { key: "b".to_string(), total: 1 },
        ];
        assert_eq!(shares(&groups), vec![75.0, 25.0]);
        assert_eq!(render_rows(&groups)[0], vec!["a", "3", "75.00%"]);
        let empty = vec![GroupTotal { key: "z".to_string(), total: 0 }];
        assert_eq!(shares(&empty), vec![0.0]);
    }

    #[test]
    fn filter_options_are_sorted_unique_with_sentinel() {
        assert_eq!(
            filter_options(&sample(), Field::Brand),
            vec!["Todas", "ACME", "Globex", "Hooli", "Initech"]
        );
        assert_eq!(
            filter_options(&sample(), Field::Location),
            vec!["Todas", "C1", "R2"]
        );
        assert_eq!(filter_options(&sample(), Field::Product)[0], "Todos");
    }

    #[test]
    fn ranked_records_sort_descending_and_keep_ties_stable() {
        let ranked = ranked_records(&sample(), Field::TotalUnits);
        let order = ranked.iter().map(|r| r.product.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["Gadget", "Gizmo", "Widget", "Widget", "Doohickey"]);
    }
}
