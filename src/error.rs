//! Structured failures raised while normalizing a spreadsheet payload.
//!
//! Every variant is terminal for the load attempt. Presentation of the
//! diagnostics (mapping tables, resulting columns) is left to the caller.

use thiserror::Error;

use crate::schema::ColumnPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Payload is not a readable spreadsheet: {reason}")]
    Parse { reason: String },

    #[error("Schema is not usable: {reason}")]
    InvalidSchema { reason: String },

    #[error("Sheet has {actual} column(s) but the schema expects {policy} {expected}")]
    ColumnCount {
        expected: usize,
        actual: usize,
        policy: ColumnPolicy,
    },

    #[error("Required column(s) missing after renaming: {}", missing.join(", "))]
    SchemaMismatch {
        missing: Vec<String>,
        mapping: Vec<(String, String)>,
        resulting: Vec<String>,
    },

    #[error(
        "Inventory is empty after dropping {dropped} row(s) without {}",
        required.join(", ")
    )]
    EmptyResult { required: Vec<String>, dropped: usize },
}

impl LoadError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        LoadError::Parse {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_schema(reason: impl Into<String>) -> Self {
        LoadError::InvalidSchema {
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Parse { .. } => "parse",
            LoadError::InvalidSchema { .. } => "invalid_schema",
            LoadError::ColumnCount { .. } => "column_count",
            LoadError::SchemaMismatch { .. } => "schema_mismatch",
            LoadError::EmptyResult { .. } => "empty_result",
        }
    }
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
