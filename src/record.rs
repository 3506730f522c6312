//! Canonical inventory records and the immutable record set.

use chrono::NaiveDate;
use serde::Serialize;

use crate::field::Field;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRecord {
    pub product: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub boxes_available: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_per_box: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loose_units: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    pub total_units: u64,
}

impl InventoryRecord {
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Product => Some(&self.product),
            Field::Brand => Some(&self.brand),
            Field::Location => self.location.as_deref(),
            _ => None,
        }
    }

    pub fn quantity(&self, field: Field) -> Option<u64> {
        match field {
            Field::BoxesAvailable => Some(self.boxes_available),
            Field::UnitsPerBox => self.units_per_box,
            Field::LooseUnits => self.loose_units,
            Field::TotalUnits => Some(self.total_units),
            _ => None,
        }
    }

    /// Value of `field` rendered as text; dates use ISO-8601.
    pub fn display_value(&self, field: Field) -> Option<String> {
        match field {
            Field::ExpirationDate => self
                .expiration_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            Field::Product | Field::Brand | Field::Location => self.text(field).map(str::to_string),
            _ => self.quantity(field).map(|q| q.to_string()),
        }
    }

    /// One display cell per field, empty when the record has no value.
    pub fn cells(&self, fields: &[Field]) -> Vec<String> {
        fields
            .iter()
            .map(|field| self.display_value(*field).unwrap_or_default())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<InventoryRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<InventoryRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InventoryRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<InventoryRecord> {
        self.records
    }

    /// Sum of a quantity field over every record; records without the field add nothing.
    pub fn total(&self, field: Field) -> u64 {
        self.records
            .iter()
            .filter_map(|r| r.quantity(field))
            .fold(0u64, u64::saturating_add)
    }
}

impl FromIterator<InventoryRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = InventoryRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a InventoryRecord;
    type IntoIter = std::slice::Iter<'a, InventoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InventoryRecord {
        InventoryRecord {
            product: "Widget".to_string(),
            brand: "Acme".to_string(),
            location: None,
            boxes_available: 4,
            units_per_box: Some(6),
            loose_units: None,
            expiration_date: NaiveDate::from_ymd_opt(2025, 7, 1),
            total_units: 24,
        }
    }

    #[test]
    fn display_values_cover_every_field_kind() {
        let record = record();
        assert_eq!(record.display_value(Field::Brand).as_deref(), Some("Acme"));
        assert_eq!(record.display_value(Field::Location), None);
        assert_eq!(
            record.display_value(Field::ExpirationDate).as_deref(),
            Some("2025-07-01")
        );
        assert_eq!(record.display_value(Field::TotalUnits).as_deref(), Some("24"));
        assert_eq!(
            record.cells(&[Field::Product, Field::LooseUnits, Field::UnitsPerBox]),
            vec!["Widget", "", "6"]
        );
    }

    #[test]
    fn totals_skip_missing_quantities() {
        let mut other = record();
        other.loose_units = Some(3);
        let set: RecordSet = vec![record(), other].into_iter().collect();
        assert_eq!(set.total(Field::TotalUnits), 48);
        assert_eq!(set.total(Field::LooseUnits), 3);
        assert_eq!(set.total(Field::Brand), 0);
    }

    #[test]
    fn into_vec_keeps_record_order() {
        let mut other = record();
        other.product = "Gadget".to_string();
        let set = RecordSet::new(vec![record(), other]);
        let products = set
            .into_vec()
            .into_iter()
            .map(|r| r.product)
            .collect::<Vec<_>>();
        assert_eq!(products, vec!["Widget", "Gadget"]);
    }
}
