// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Models
//!
//! A **Model** is a record type backed by a relational table: it knows its
//! table, the connection it lives on, which columns are hidden, and how to
//! turn itself into a plain mapping.
//!
//! Application types implement the `Model` trait directly. `ModelDefinition`
//! is a data-driven implementation used by the CLI, where models are declared
//! in the configuration file instead of in code.

use crate::domain::entities::{Row, StructHints};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record backed by a relational table.
pub trait Model {
    /// Name of the backing table.
    fn table(&self) -> &str;

    /// Named database connection; `None` means the default connection.
    fn connection_name(&self) -> Option<&str> {
        None
    }

    /// Hidden columns never leave the database: they are left out of both
    /// `to_row` and the derived warehouse schema.
    fn is_hidden(&self, _column: &str) -> bool {
        false
    }

    /// Whether the column holds a boolean stored as `tinyint`.
    fn casts_to_boolean(&self, _column: &str) -> bool {
        false
    }

    /// Whether the primary key is auto-incrementing.
    fn incrementing(&self) -> bool {
        true
    }

    /// Primary key value, if the record has one.
    fn key(&self) -> Option<Value>;

    /// Visible attributes as a plain mapping.
    fn to_row(&self) -> Row;
}

/// Input to the row preparer: a model or an already-plain mapping.
pub enum RowItem<'a> {
    Model(&'a dyn Model),
    Plain(Row),
}

impl<'a, M: Model> From<&'a M> for RowItem<'a> {
    fn from(model: &'a M) -> Self {
        RowItem::Model(model)
    }
}

impl From<Row> for RowItem<'_> {
    fn from(row: Row) -> Self {
        RowItem::Plain(row)
    }
}

fn default_incrementing() -> bool {
    true
}

fn default_key_name() -> String {
    "id".to_string()
}

/// A model declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDefinition {
    pub table: String,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default = "default_incrementing")]
    pub incrementing: bool,
    #[serde(default = "default_key_name")]
    pub key_name: String,
    #[serde(default)]
    pub hidden: Vec<String>,
    #[serde(default)]
    pub boolean_columns: Vec<String>,
    /// Nested schemas for JSON columns.
    #[serde(default)]
    pub structs: StructHints,
    #[serde(default)]
    pub attributes: Row,
}

impl ModelDefinition {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            connection: None,
            incrementing: true,
            key_name: default_key_name(),
            hidden: Vec::new(),
            boolean_columns: Vec::new(),
            structs: StructHints::new(),
            attributes: Row::new(),
        }
    }

    /// Same definition, carrying a record's attributes.
    pub fn with_attributes(&self, attributes: Row) -> Self {
        Self {
            attributes,
            ..self.clone()
        }
    }

    /// Struct hints, or `None` when none were declared.
    pub fn struct_hints(&self) -> Option<&StructHints> {
        if self.structs.is_empty() {
            None
        } else {
            Some(&self.structs)
        }
    }
}

impl Model for ModelDefinition {
    fn table(&self) -> &str {
        &self.table
    }

    fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    fn is_hidden(&self, column: &str) -> bool {
        self.hidden.iter().any(|h| h == column)
    }

    fn casts_to_boolean(&self, column: &str) -> bool {
        self.boolean_columns.iter().any(|b| b == column)
    }

    fn incrementing(&self) -> bool {
        self.incrementing
    }

    fn key(&self) -> Option<Value> {
        self.attributes.get(&self.key_name).cloned()
    }

    fn to_row(&self) -> Row {
        self.attributes
            .iter()
            .filter(|(name, _)| !self.is_hidden(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}
