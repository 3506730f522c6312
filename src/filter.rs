use anyhow::{Result, anyhow};

use crate::{
    cli::FilterArgs,
    field::Field,
    record::{InventoryRecord, RecordSet},
};

/// Selector values meaning "no constraint on this field".
pub const ALL_SENTINELS: &[&str] = &["Todas", "Todos"];

pub const ALL_BRANDS: &str = "Todas";
pub const ALL_LOCATIONS: &str = "Todas";
pub const ALL_PRODUCTS: &str = "Todos";

pub fn is_all_sentinel(value: &str) -> bool {
    let trimmed = value.trim();
    ALL_SENTINELS
        .iter()
        .any(|sentinel| sentinel.eq_ignore_ascii_case(trimmed))
}

/// Sentinel shown in front of a field's selector options.
pub fn sentinel_for(field: Field) -> &'static str {
    match field {
        Field::Product => ALL_PRODUCTS,
        Field::Location => ALL_LOCATIONS,
        _ => ALL_BRANDS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: Field,
    pub value: String,
}

impl FilterCondition {
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Parses `field=value` (or `field == value`); the value may be quoted.
    pub fn parse(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Empty filter expression"));
        }
        let (left, right) = match trimmed.find("==") {
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 2..]),
            None => trimmed
                .split_once('=')
                .ok_or_else(|| anyhow!("Failed to parse filter expression '{trimmed}'"))?,
        };
        let field: Field = left.trim().parse()?;
        Ok(Self::new(field, unquote(right.trim())))
    }

    pub fn is_unconstrained(&self) -> bool {
        is_all_sentinel(&self.value)
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        record
            .display_value(self.field)
            .is_some_and(|value| value == self.value)
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Conjunction of equality constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    conditions: Vec<FilterCondition>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.push(FilterCondition::new(field, value));
        self
    }

    pub fn push(&mut self, condition: FilterCondition) {
        self.conditions.push(condition);
    }

    /// True when no condition actually constrains anything.
    pub fn is_unconstrained(&self) -> bool {
        self.conditions.iter().all(FilterCondition::is_unconstrained)
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }

    /// Selected value for `field`, or its sentinel when unconstrained.
    pub fn selection(&self, field: Field) -> String {
        self.conditions
            .iter()
            .rev()
            .find(|c| c.field == field && !c.is_unconstrained())
            .map(|c| c.value.clone())
            .unwrap_or_else(|| sentinel_for(field).to_string())
    }
}

pub fn parse_filters(filters: &[String]) -> Result<Criteria> {
    let mut criteria = Criteria::new();
    for expression in filters {
        criteria.push(FilterCondition::parse(expression)?);
    }
    Ok(criteria)
}

/// Builds criteria from the selector flags plus any `--filter` expressions.
pub fn criteria_from_args(args: &FilterArgs) -> Result<Criteria> {
    let mut criteria = Criteria::new()
        .with(Field::Brand, args.brand.clone())
        .with(Field::Location, args.location.clone())
        .with(Field::Product, args.product.clone());
    for condition in parse_filters(&args.filters)?.conditions {
        criteria.push(condition);
    }
    Ok(criteria)
}

/// Records satisfying every condition, in their original order.
pub fn filter(records: &RecordSet, criteria: &Criteria) -> RecordSet {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}
