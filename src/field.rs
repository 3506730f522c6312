//! Canonical inventory fields.
//!
//! Source spreadsheets name their columns however they like (`PRODUCTO`,
//! `CAJA APROX`, ...). Schemas rename them onto this closed set of canonical
//! names, which is what the rest of the pipeline works with.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow};
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Field {
    Product,
    Brand,
    Location,
    BoxesAvailable,
    UnitsPerBox,
    LooseUnits,
    ExpirationDate,
    TotalUnits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Quantity,
    Date,
    Derived,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Product,
        Field::Brand,
        Field::Location,
        Field::BoxesAvailable,
        Field::UnitsPerBox,
        Field::LooseUnits,
        Field::ExpirationDate,
        Field::TotalUnits,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Product => "product",
            Field::Brand => "brand",
            Field::Location => "location",
            Field::BoxesAvailable => "boxes_available",
            Field::UnitsPerBox => "units_per_box",
            Field::LooseUnits => "loose_units",
            Field::ExpirationDate => "expiration_date",
            Field::TotalUnits => "total_units",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Product | Field::Brand | Field::Location => FieldKind::Text,
            Field::BoxesAvailable | Field::UnitsPerBox | Field::LooseUnits => FieldKind::Quantity,
            Field::ExpirationDate => FieldKind::Date,
            Field::TotalUnits => FieldKind::Derived,
        }
    }

    /// True for fields that can be summed: source quantities and the derived total.
    pub fn is_summable(self) -> bool {
        matches!(self.kind(), FieldKind::Quantity | FieldKind::Derived)
    }

    /// True for fields that can be bound to a spreadsheet column.
    pub fn is_source(self) -> bool {
        self.kind() != FieldKind::Derived
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_snake_case();
        let field = match normalized.as_str() {
            "product" => Field::Product,
            "brand" => Field::Brand,
            "location" => Field::Location,
            "boxes_available" | "boxes" => Field::BoxesAvailable,
            "units_per_box" => Field::UnitsPerBox,
            "loose_units" | "loose" => Field::LooseUnits,
            "expiration_date" | "expiry" => Field::ExpirationDate,
            "total_units" | "total" => Field::TotalUnits,
            _ => {
                return Err(anyhow!(
                    "Unknown field '{value}'. Expected one of: {}",
                    Field::ALL
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
        };
        Ok(field)
    }
}

impl TryFrom<String> for Field {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        field.as_str().to_string()
    }
}

/// `clap` value parser for field arguments.
pub fn parse_field(value: &str) -> std::result::Result<Field, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}
