use crate::{
    coerce::TypedRow,
    field::Field,
    record::InventoryRecord,
    schema::Derivation,
};

/// Computes `total_units` for one row. Arithmetic saturates at `u64::MAX`.
pub fn total_units(row: &TypedRow, derivation: &Derivation) -> u64 {
    match derivation {
        Derivation::Alias { field } => match field {
            Field::BoxesAvailable => row.boxes_available,
            Field::UnitsPerBox => row.units_per_box.unwrap_or(0),
            Field::LooseUnits => row.loose_units.unwrap_or(0),
            _ => 0,
        },
        Derivation::BoxesTimesUnits => row
            .boxes_available
            .saturating_mul(row.units_per_box.unwrap_or(0))
            .saturating_add(row.loose_units.unwrap_or(0)),
    }
}

pub fn derive_records(rows: Vec<TypedRow>, derivation: &Derivation) -> Vec<InventoryRecord> {
    rows.into_iter()
        .map(|row| {
            let total_units = total_units(&row, derivation);
            InventoryRecord {
                product: row.product,
                brand: row.brand,
                location: row.location,
                boxes_available: row.boxes_available,
                units_per_box: row.units_per_box,
                loose_units: row.loose_units,
                expiration_date: row.expiration_date,
                total_units,
            }
        })
        .collect()
}
