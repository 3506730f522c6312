//! Schema model, presets, and YAML persistence.
//!
//! A [`Schema`] is the declarative column contract a spreadsheet export must
//! honour: the ordered source headers, how they rename onto canonical
//! [`Field`]s, which fields must survive renaming, which fields every row must
//! carry, how `total_units` is derived, and how strictly the column count is
//! checked.
//!
//! ## Responsibilities
//!
//! - YAML schema loading and saving via `serde_yaml`
//! - Built-in presets for the known inventory sheet layouts
//! - Column rename mapping resolution
//! - Per-column value replacements
//! - Consistency checks before a schema is used by the loader

use std::{borrow::Cow, collections::HashSet, fmt, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    data::CellValue,
    error::{LoadError, LoadResult},
    field::{Field, FieldKind},
};

pub const DEFAULT_PRESET: &str = "camaras";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// The sheet must have exactly as many columns as the schema declares.
    #[default]
    Exact,
    /// Extra trailing columns are tolerated and ignored.
    AtLeast,
}

impl ColumnPolicy {
    pub fn accepts(self, expected: usize, actual: usize) -> bool {
        match self {
            ColumnPolicy::Exact => actual == expected,
            ColumnPolicy::AtLeast => actual >= expected,
        }
    }
}

impl fmt::Display for ColumnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnPolicy::Exact => f.write_str("exactly"),
            ColumnPolicy::AtLeast => f.write_str("at least"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueReplacement {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    #[serde(
        default,
        rename = "replace",
        alias = "value_replacements",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub value_replacements: Vec<ValueReplacement>,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_replacements: Vec::new(),
        }
    }

    pub fn with_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.value_replacements.push(ValueReplacement {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn normalize_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let trimmed = value.trim();
        for replacement in &self.value_replacements {
            if trimmed == replacement.from.trim() {
                return Cow::Owned(replacement.to.clone());
            }
        }
        Cow::Borrowed(value)
    }

    /// Applies value replacements to a cell. Typed cells (numbers from XLSX
    /// sheets, booleans, dates) are matched on their rendered text, so `1`
    /// and `"1"` are replaced alike; unmatched cells keep their type.
    pub fn normalize_cell(&self, cell: &CellValue) -> CellValue {
        if self.value_replacements.is_empty() {
            return cell.clone();
        }
        match cell {
            CellValue::Text(text) => CellValue::text(self.normalize_value(text).into_owned()),
            CellValue::Empty => CellValue::Empty,
            typed => match typed.as_text() {
                Some(rendered) => match self.normalize_value(&rendered) {
                    Cow::Owned(replaced) => CellValue::text(replaced),
                    Cow::Borrowed(_) => typed.clone(),
                },
                None => typed.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMapping {
    pub from: String,
    pub to: String,
}

/// How `total_units` is computed for every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Derivation {
    /// `total_units` copies an existing quantity column.
    Alias { field: Field },
    /// `total_units = boxes_available * units_per_box + loose_units`.
    BoxesTimesUnits,
}

impl Derivation {
    pub fn inputs(&self) -> Vec<Field> {
        match self {
            Derivation::Alias { field } => vec![*field],
            Derivation::BoxesTimesUnits => vec![Field::BoxesAvailable, Field::UnitsPerBox],
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Derivation::Alias { field } => format!("alias of {field}"),
            Derivation::BoxesTimesUnits => {
                "boxes_available * units_per_box + loose_units".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<SourceColumn>,
    #[serde(default)]
    pub mapping: Vec<ColumnMapping>,
    pub required: Vec<Field>,
    #[serde(default)]
    pub required_for_rows: Vec<Field>,
    pub derivation: Derivation,
    #[serde(default)]
    pub column_policy: ColumnPolicy,
}

impl Schema {
    pub fn expected_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn source_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn mapping_pairs(&self) -> Vec<(String, String)> {
        self.mapping
            .iter()
            .map(|m| (m.from.clone(), canonical_target(&m.to)))
            .collect()
    }

    /// Name a source column carries after renaming. Unmapped columns keep their source name.
    pub fn canonical_name(&self, source: &str) -> String {
        self.mapping
            .iter()
            .find(|m| m.from == source)
            .map(|m| canonical_target(&m.to))
            .unwrap_or_else(|| source.to_string())
    }

    pub fn canonical_headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| self.canonical_name(&c.name))
            .collect()
    }

    /// Fields every surviving row must carry. Product and brand are always included.
    pub fn row_required_fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Product, Field::Brand];
        for field in &self.required_for_rows {
            if !fields.contains(field) {
                fields.push(*field);
            }
        }
        fields
    }

    /// Record fields this schema can populate, in display order.
    pub fn record_fields(&self) -> Vec<Field> {
        let headers = self.canonical_headers();
        let mut fields = Field::ALL
            .into_iter()
            .filter(|field| field.is_source() && headers.iter().any(|h| h == field.as_str()))
            .collect::<Vec<_>>();
        fields.push(Field::TotalUnits);
        fields
    }

    pub fn has_field(&self, field: Field) -> bool {
        field == Field::TotalUnits || self.record_fields().contains(&field)
    }

    pub fn validate(&self) -> LoadResult<()> {
        if self.columns.is_empty() {
            return Err(LoadError::invalid_schema("schema declares no columns"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            let name = column.name.trim();
            if name.is_empty() {
                return Err(LoadError::invalid_schema("source column names cannot be empty"));
            }
            if !seen.insert(name) {
                return Err(LoadError::invalid_schema(format!(
                    "source column '{name}' is declared more than once"
                )));
            }
        }

        let mut targets = HashSet::new();
        for mapping in &self.mapping {
            let target = canonical_target(&mapping.to);
            if target == Field::TotalUnits.as_str() {
                return Err(LoadError::invalid_schema(
                    "total_units is derived and cannot be mapped from a source column",
                ));
            }
            if !targets.insert(target.clone()) {
                return Err(LoadError::invalid_schema(format!(
                    "more than one source column maps to '{target}'"
                )));
            }
        }

        let mut headers = HashSet::new();
        for header in self.canonical_headers() {
            if !headers.insert(header.clone()) {
                return Err(LoadError::invalid_schema(format!(
                    "column '{header}' appears more than once after renaming"
                )));
            }
        }

        for field in [Field::Product, Field::Brand, Field::BoxesAvailable] {
            if !self.required.contains(&field) {
                return Err(LoadError::invalid_schema(format!(
                    "required columns must include '{field}'"
                )));
            }
        }
        if let Some(field) = self.required.iter().find(|f| !f.is_source()) {
            return Err(LoadError::invalid_schema(format!(
                "'{field}' is derived and cannot be required from the sheet"
            )));
        }
        if let Some(field) = self
            .required_for_rows
            .iter()
            .find(|f| !self.required.contains(f))
        {
            return Err(LoadError::invalid_schema(format!(
                "row-required column '{field}' must also be listed as required"
            )));
        }

        for field in self.derivation.inputs() {
            if field.kind() != FieldKind::Quantity {
                return Err(LoadError::invalid_schema(format!(
                    "derivation input '{field}' is not a quantity column"
                )));
            }
            if !self.required.contains(&field) {
                return Err(LoadError::invalid_schema(format!(
                    "derivation input '{field}' must be listed as required"
                )));
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: Schema = serde_yaml::from_reader(reader).context("Parsing schema YAML")?;
        schema
            .validate()
            .with_context(|| format!("Validating schema {path:?}"))?;
        Ok(schema)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing schema YAML")
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing schema to YAML string")
    }

    pub fn preset(name: &str) -> Option<Schema> {
        let schema = match name.trim().to_ascii_lowercase().as_str() {
            "camaras" => preset_camaras(),
            "cajas" => preset_cajas(),
            "sueltos" => preset_sueltos(),
            "vencimientos" => preset_vencimientos(),
            _ => return None,
        };
        Some(schema)
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["camaras", "cajas", "sueltos", "vencimientos"]
    }
}

fn canonical_target(target: &str) -> String {
    target
        .parse::<Field>()
        .map(|field| field.as_str().to_string())
        .unwrap_or_else(|_| target.trim().to_string())
}

fn build_preset(
    name: &str,
    columns: &[(&str, Field)],
    required_for_rows: &[Field],
    derivation: Derivation,
    column_policy: ColumnPolicy,
) -> Schema {
    Schema {
        name: Some(name.to_string()),
        columns: columns.iter().map(|(source, _)| SourceColumn::new(*source)).collect(),
        mapping: columns
            .iter()
            .map(|(source, field)| ColumnMapping {
                from: source.to_string(),
                to: field.as_str().to_string(),
            })
            .collect(),
        required: columns.iter().map(|(_, field)| *field).collect(),
        required_for_rows: required_for_rows.to_vec(),
        derivation,
        column_policy,
    }
}

/// Cold rooms sheet: boxes only, every column mandatory on every row.
fn preset_camaras() -> Schema {
    build_preset(
        "camaras",
        &[
            ("MARCA", Field::Brand),
            ("PRODUCTO", Field::Product),
            ("CAJA APROX", Field::BoxesAvailable),
            ("UBICACION", Field::Location),
        ],
        &[
            Field::Product,
            Field::Brand,
            Field::Location,
            Field::BoxesAvailable,
        ],
        Derivation::Alias {
            field: Field::BoxesAvailable,
        },
        ColumnPolicy::Exact,
    )
}

fn preset_cajas() -> Schema {
    build_preset(
        "cajas",
        &[
            ("PRODUCTO", Field::Product),
            ("CAJAS", Field::BoxesAvailable),
            ("UNID X CAJA", Field::UnitsPerBox),
            ("MARCA", Field::Brand),
            ("UBICACION", Field::Location),
        ],
        &[Field::Product, Field::Brand],
        Derivation::BoxesTimesUnits,
        ColumnPolicy::AtLeast,
    )
}

fn preset_sueltos() -> Schema {
    build_preset(
        "sueltos",
        &[
            ("PRODUCTO", Field::Product),
            ("MARCA", Field::Brand),
            ("CAJAS", Field::BoxesAvailable),
            ("UNID X CAJA", Field::UnitsPerBox),
            ("UNIDADES", Field::LooseUnits),
            ("UBICACION", Field::Location),
        ],
        &[Field::Product, Field::Brand, Field::Location],
        Derivation::BoxesTimesUnits,
        ColumnPolicy::AtLeast,
    )
}

fn preset_vencimientos() -> Schema {
    build_preset(
        "vencimientos",
        &[
            ("PRODUCTO", Field::Product),
            ("MARCA", Field::Brand),
            ("UBICACION", Field::Location),
            ("CAJAS", Field::BoxesAvailable),
            ("UNIDADES", Field::LooseUnits),
            ("VENCIMIENTO", Field::ExpirationDate),
        ],
        &[Field::Product, Field::Brand],
        Derivation::Alias {
            field: Field::LooseUnits,
        },
        ColumnPolicy::AtLeast,
    )
}
