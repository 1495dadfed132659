//! # Domain Entities
//!
//! The "Nouns" of the bridge: schema fields, describe rows, prepared insert
//! rows, query job handles and insert outcomes.
//!
//! Most of these serialize straight into the JSON shapes BigQuery's REST API
//! expects, so the adapters can hand them over with `serde_json::to_value`.

use crate::domain::types::WarehouseType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// One result row: column name -> value.
pub type Row = Map<String, Value>;

/// Developer-supplied nested schemas for JSON columns, keyed by column name.
pub type StructHints = HashMap<String, Vec<SchemaField>>;

/// Column nullability in a BigQuery schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
    Nullable,
}

/// A single column in a BigQuery table schema (`TableFieldSchema`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: WarehouseType,
    /// Nested descriptors synthesized from row values carry no mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FieldMode>,
    /// Only set for `STRUCT` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SchemaField>>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: WarehouseType, mode: FieldMode) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: Some(mode),
            fields: None,
        }
    }

    /// A `STRUCT` column with its nested body.
    pub fn record(name: impl Into<String>, mode: FieldMode, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            field_type: WarehouseType::Struct,
            mode: Some(mode),
            fields: Some(fields),
        }
    }
}

/// One row of `DESCRIBE <table>` output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnRecord {
    pub field: String,
    /// Native type, possibly with a length suffix (e.g. `varchar(255)`).
    #[serde(rename = "Type")]
    pub column_type: String,
    /// `YES` or `NO`.
    pub null: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub extra: Option<String>,
}

impl ColumnRecord {
    pub fn new(field: &str, column_type: &str, null: &str) -> Self {
        Self {
            field: field.to_string(),
            column_type: column_type.to_string(),
            null: null.to_string(),
            key: None,
            default: None,
            extra: None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.null.eq_ignore_ascii_case("yes")
    }
}

/// A row ready for a streaming insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreparedRow {
    /// Set for auto-incrementing models so BigQuery can de-duplicate retries.
    #[serde(rename = "insertId", skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<Value>,
    pub data: Row,
    /// Descriptors for the nested mappings found in `data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SchemaField>>,
}

/// Handle to a table that exists in the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(project_id: &str, dataset_id: &str, table_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            dataset_id: dataset_id.to_string(),
            table_id: table_id.to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// Options sent with every query job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub use_legacy_sql: bool,
    pub use_query_cache: bool,
    /// Job location (e.g. `US`); the adapter's default applies when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            use_legacy_sql: false,
            use_query_cache: false,
            location: None,
        }
    }
}

/// Status of a submitted query job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryJob {
    pub job_id: String,
    pub location: Option<String>,
    pub complete: bool,
}

/// Options for `insertAll`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertOptions {
    pub ignore_unknown_values: bool,
    pub skip_invalid_rows: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            ignore_unknown_values: true,
            skip_invalid_rows: false,
        }
    }
}

/// A row BigQuery rejected, with the errors it reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedRow {
    pub index: usize,
    pub errors: Vec<Value>,
}

/// Raw result of an `insertAll` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertResponse {
    pub failed_rows: Vec<FailedRow>,
    /// The full response body.
    pub info: Value,
}

impl InsertResponse {
    pub fn is_successful(&self) -> bool {
        self.failed_rows.is_empty()
    }
}

/// Verbose insert summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InsertReport {
    pub affected_rows: usize,
    pub errors: Vec<Value>,
    pub info: Value,
}

/// What `Bridge::insert` hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// Every row was accepted (terse mode).
    Success,
    /// Terse mode with rejections: all row errors, flattened.
    Failed(Vec<Value>),
    /// Verbose mode, regardless of success.
    Report(InsertReport),
}

impl InsertOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            InsertOutcome::Success => true,
            InsertOutcome::Failed(_) => false,
            InsertOutcome::Report(r) => r.errors.is_empty(),
        }
    }
}
