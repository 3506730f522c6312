mod common;

use common::CAMARAS_CSV;
use inventory_normalizer::{
    Field, InventoryRecord, RecordSet, Schema,
    aggregate::{GroupTotal, aggregate_by, filter_options, top_n},
    filter::{Criteria, filter, parse_filters},
    load,
};
use proptest::prelude::*;

fn camaras_records() -> RecordSet {
    let schema = Schema::preset("camaras").expect("preset");
    load(CAMARAS_CSV.as_bytes(), &schema).expect("load")
}

#[test]
fn brand_filter_returns_exact_subset_in_order() {
    let records = camaras_records();
    let filtered = filter(&records, &Criteria::new().with(Field::Brand, "Globex"));
    let expected = records
        .iter()
        .filter(|r| r.brand == "Globex")
        .cloned()
        .collect::<RecordSet>();
    assert_eq!(filtered, expected);
    assert_eq!(filtered.len(), 2);
}

#[test]
fn parsed_filters_combine_conjunctively() {
    let records = camaras_records();
    let criteria = parse_filters(&[
        "brand=Acme".to_string(),
        "location='Camara 1'".to_string(),
    ])
    .expect("filters");
    let filtered = filter(&records, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.records()[0].product, "Widget");
}

#[test]
fn aggregate_by_brand_orders_descending() {
    let groups = aggregate_by(&camaras_records(), Field::Brand, Field::TotalUnits).expect("agg");
    assert_eq!(
        groups,
        vec![
            GroupTotal { key: "Acme".to_string(), total: 14 },
            GroupTotal { key: "Globex".to_string(), total: 6 },
        ]
    );
    assert_eq!(top_n(&groups, 1), &groups[..1]);
}

#[test]
fn filter_options_cover_the_whole_set() {
    let records = camaras_records();
    assert_eq!(
        filter_options(&records, Field::Product),
        vec!["Todos", "Gadget", "Gizmo", "Widget"]
    );
    assert_eq!(
        filter_options(&records, Field::Location),
        vec!["Todas", "Camara 1", "Reefer 2"]
    );
}

fn record_strategy() -> impl Strategy<Value = InventoryRecord> {
    (
        prop::sample::select(vec!["Widget", "Gadget", "Gizmo"]),
        prop::sample::select(vec!["ACME", "Globex", "Initech"]),
        prop::option::of(prop::sample::select(vec!["Camara 1", "Reefer 2"])),
        0u64..1_000,
        0u64..50,
    )
        .prop_map(|(product, brand, location, boxes, units)| InventoryRecord {
            product: product.to_string(),
            brand: brand.to_string(),
            location: location.map(str::to_string),
            boxes_available: boxes,
            units_per_box: Some(units),
            loose_units: None,
            expiration_date: None,
            total_units: boxes * units,
        })
}

fn record_set_strategy() -> impl Strategy<Value = RecordSet> {
    prop::collection::vec(record_strategy(), 0..40).prop_map(RecordSet::new)
}

proptest! {
    #[test]
    fn sentinel_filters_are_a_no_op(records in record_set_strategy()) {
        let criteria = Criteria::new()
            .with(Field::Brand, "Todas")
            .with(Field::Location, "Todas")
            .with(Field::Product, "Todos");
        prop_assert_eq!(filter(&records, &criteria), records);
    }

    #[test]
    fn brand_filter_keeps_exactly_matching_records(records in record_set_strategy()) {
        let filtered = filter(&records, &Criteria::new().with(Field::Brand, "ACME"));
        prop_assert!(filtered.iter().all(|r| r.brand == "ACME"));
        prop_assert_eq!(
            filtered.len(),
            records.iter().filter(|r| r.brand == "ACME").count()
        );
    }

    #[test]
    fn brand_group_sums_add_up_to_the_grand_total(records in record_set_strategy()) {
        let groups = aggregate_by(&records, Field::Brand, Field::TotalUnits).unwrap();
        let summed: u64 = groups.iter().map(|g| g.total).sum();
        prop_assert_eq!(summed, records.total(Field::TotalUnits));
        prop_assert!(groups.windows(2).all(|w| w[0].total >= w[1].total));
    }

    #[test]
    fn top_n_is_a_prefix(records in record_set_strategy(), n in 0usize..10) {
        let groups = aggregate_by(&records, Field::Product, Field::BoxesAvailable).unwrap();
        let top = top_n(&groups, n);
        prop_assert_eq!(top.len(), n.min(groups.len()));
        prop_assert_eq!(top, &groups[..top.len()]);
    }
}
