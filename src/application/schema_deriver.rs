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

//! # Schema Deriver
//!
//! Flips a model into a BigQuery schema. The model's table is described
//! through its own connection, hidden columns are dropped, and every
//! remaining column goes through the type table in `domain::types`.
//!
//! JSON columns have no fixed shape, so they need a struct hint from the
//! caller. A JSON column without a hint is left out of the schema.

use crate::domain::entities::{ColumnRecord, FieldMode, SchemaField, StructHints};
use crate::domain::errors::Result;
use crate::domain::model::Model;
use crate::domain::types::{map_native_type, WarehouseType};
use crate::ports::cache_port::MetadataCache;
use crate::ports::describe_port::DescribePort;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Prefix of every describe cache key; the table name follows.
pub const CACHE_PREFIX: &str = "warehouse_bridge.describe.";

/// Describe results live this long unless configured otherwise.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 24 * 60 * 60);

pub struct SchemaDeriver {
    describer: Arc<dyn DescribePort>,
    cache: Arc<dyn MetadataCache>,
    ttl: Duration,
}

impl SchemaDeriver {
    pub fn new(describer: Arc<dyn DescribePort>, cache: Arc<dyn MetadataCache>, ttl: Duration) -> Self {
        Self {
            describer,
            cache,
            ttl,
        }
    }

    /// Derives the warehouse schema of `model`'s table.
    pub fn derive(&self, model: &dyn Model, structs: Option<&StructHints>) -> Result<Vec<SchemaField>> {
        let columns: Vec<ColumnRecord> = self
            .describe_cached(model)?
            .into_iter()
            .filter(|c| !model.is_hidden(&c.field))
            .collect();

        Ok(field_map(&columns, structs, |column| model.casts_to_boolean(column)))
    }

    fn describe_cached(&self, model: &dyn Model) -> Result<Vec<ColumnRecord>> {
        let key = format!("{}{}", CACHE_PREFIX, model.table());

        if let Some(columns) = self.cache.get(&key) {
            debug!("Describe cache hit for {}", model.table());
            return Ok(columns);
        }

        info!(
            "Describing table {} on connection {}",
            model.table(),
            model.connection_name().unwrap_or("<default>")
        );
        let columns = self.describer.describe(model.connection_name(), model.table())?;
        self.cache.put(&key, columns.clone(), self.ttl);
        Ok(columns)
    }
}

/// Maps describe rows to schema fields.
///
/// `is_boolean` says which columns are booleans stored as `tinyint`.
pub fn field_map(
    columns: &[ColumnRecord],
    structs: Option<&StructHints>,
    is_boolean: impl Fn(&str) -> bool,
) -> Vec<SchemaField> {
    let mut map = Vec::with_capacity(columns.len());

    for column in columns {
        let field_type = map_native_type(&column.column_type, is_boolean(&column.field));
        let mode = if column.is_nullable() {
            FieldMode::Nullable
        } else {
            FieldMode::Required
        };

        if field_type == WarehouseType::Struct {
            match structs.and_then(|hints| hints.get(&column.field)) {
                Some(body) => map.push(SchemaField::record(&column.field, mode, body.clone())),
                None => debug!("Skipping JSON column {} without a struct hint", column.field),
            }
            continue;
        }

        map.push(SchemaField::new(&column.field, field_type, mode));
    }

    map
}
