//! All inventory views at once: ranked detail, top products, totals per brand
//! and per location, plus the selector options a front end would offer.

use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::{
    aggregate::{self, GroupTotal},
    cli::DashboardArgs,
    field::Field,
    filter::{self, Criteria},
    record::RecordSet,
    records::{alignments, tabulate},
    schema::Schema,
    source,
    table::{self, Align},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub brand: String,
    pub location: String,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub brands: Vec<String>,
    /// Empty when the schema carries no location column.
    pub locations: Vec<String>,
    pub products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub measure: Field,
    pub record_count: usize,
    pub grand_total: u64,
    pub selection: Selection,
    pub options: FilterOptions,
    pub top_products: Vec<GroupTotal>,
    pub by_brand: Vec<GroupTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_location: Option<Vec<GroupTotal>>,
    pub records: RecordSet,
}

impl Dashboard {
    /// Options come from the unfiltered set so selectors never hide themselves.
    pub fn build(
        all: &RecordSet,
        schema: &Schema,
        criteria: &Criteria,
        measure: Field,
        top: usize,
    ) -> Result<Self> {
        let filtered = filter::filter(all, criteria);
        let has_location = schema.has_field(Field::Location);

        let products = aggregate::aggregate_by(&filtered, Field::Product, measure)?;
        let by_brand = aggregate::aggregate_by(&filtered, Field::Brand, measure)?;
        let by_location = if has_location {
            Some(aggregate::aggregate_by(&filtered, Field::Location, measure)?)
        } else {
            None
        };

        Ok(Self {
            measure,
            record_count: filtered.len(),
            grand_total: filtered.total(measure),
            selection: Selection {
                brand: criteria.selection(Field::Brand),
                location: criteria.selection(Field::Location),
                product: criteria.selection(Field::Product),
            },
            options: FilterOptions {
                brands: aggregate::filter_options(all, Field::Brand),
                locations: if has_location {
                    aggregate::filter_options(all, Field::Location)
                } else {
                    Vec::new()
                },
                products: aggregate::filter_options(all, Field::Product),
            },
            top_products: aggregate::top_n(&products, top).to_vec(),
            by_brand,
            by_location,
            records: aggregate::ranked_records(&filtered, measure),
        })
    }

    pub fn render_text(&self, fields: &[Field]) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Selection: brand={} location={} product={}\n",
            self.selection.brand, self.selection.location, self.selection.product
        ));
        out.push_str(&format!(
            "{} record(s), {} {} in total\n",
            self.record_count, self.grand_total, self.measure
        ));

        let group_aligns = [Align::Left, Align::Right, Align::Right];
        let sections = [
            ("Top products", Field::Product, Some(&self.top_products)),
            ("By brand", Field::Brand, Some(&self.by_brand)),
            ("By location", Field::Location, self.by_location.as_ref()),
        ];
        for (title, field, groups) in sections {
            let Some(groups) = groups else {
                continue;
            };
            let headers = vec![
                field.to_string(),
                self.measure.to_string(),
                "share".to_string(),
            ];
            out.push_str(&format!("\n{title}\n"));
            out.push_str(&table::render_aligned_table(
                &headers,
                &aggregate::render_rows(groups),
                &group_aligns,
            ));
        }

        let (headers, rows) = tabulate(&self.records, fields);
        out.push_str("\nRecords\n");
        out.push_str(&table::render_aligned_table(&headers, &rows, &alignments(fields)));
        out
    }
}

#[derive(Serialize)]
struct DashboardDocument<'a> {
    fingerprint: &'a str,
    #[serde(flatten)]
    dashboard: &'a Dashboard,
}

pub fn execute(args: &DashboardArgs) -> Result<()> {
    let inventory = source::load_inventory(&args.source)?;
    let criteria = filter::criteria_from_args(&args.filters)?;
    let dashboard = Dashboard::build(
        &inventory.records,
        &inventory.schema,
        &criteria,
        args.measure,
        args.top,
    )?;

    if args.json {
        let document = DashboardDocument {
            fingerprint: &inventory.fingerprint,
            dashboard: &dashboard,
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", dashboard.render_text(&inventory.schema.record_fields()));
    }
    info!(
        "Dashboard built over {} of {} record(s)",
        dashboard.record_count,
        inventory.records.len()
    );
    Ok(())
}
