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

//! # Row Preparer
//!
//! Turns models and plain mappings into `PreparedRow`s for `insertAll`.
//!
//! Auto-incrementing models are tagged with their primary key as `insertId`,
//! which lets BigQuery drop duplicates when a streaming insert is retried.
//! Nested mappings inside a row are described as struct fields, typed from
//! their runtime values.

use crate::domain::entities::{PreparedRow, Row, SchemaField};
use crate::domain::model::RowItem;
use crate::domain::types::WarehouseType;
use serde_json::Value;

/// Prepares every item for a streaming insert, preserving order.
pub fn prepare<'a, I>(items: I) -> Vec<PreparedRow>
where
    I: IntoIterator<Item = RowItem<'a>>,
{
    items.into_iter().map(prepare_item).collect()
}

fn prepare_item(item: RowItem<'_>) -> PreparedRow {
    let (data, insert_id) = match item {
        RowItem::Model(model) => {
            let insert_id = if model.incrementing() { model.key() } else { None };
            (model.to_row(), insert_id)
        }
        RowItem::Plain(row) => (row, None),
    };

    let struct_fields = nested_fields(&data);

    PreparedRow {
        insert_id,
        data,
        fields: if struct_fields.is_empty() {
            None
        } else {
            Some(struct_fields)
        },
    }
}

/// One descriptor per key of every nested mapping in `data`.
fn nested_fields(data: &Row) -> Vec<SchemaField> {
    data.values()
        .filter_map(Value::as_object)
        .flat_map(|nested| nested.iter().map(|(key, value)| describe_value(key, value)))
        .collect()
}

fn describe_value(name: &str, value: &Value) -> SchemaField {
    let field_type = runtime_type(value);
    let fields = match value {
        Value::Object(inner) if !inner.is_empty() => Some(
            inner
                .iter()
                .map(|(key, v)| describe_value(key, v))
                .collect(),
        ),
        _ => None,
    };

    SchemaField {
        name: name.to_string(),
        field_type,
        mode: None,
        fields,
    }
}

/// Warehouse type of a runtime JSON value.
///
/// Descriptors use BigQuery type names, not the value's own type name:
/// floats are FLOAT (never DOUBLE), and arrays and nulls are STRING since
/// BigQuery has no ARRAY or NULL column type.
fn runtime_type(value: &Value) -> WarehouseType {
    match value {
        Value::Bool(_) => WarehouseType::Boolean,
        Value::Number(n) if n.is_f64() => WarehouseType::Float,
        Value::Number(_) => WarehouseType::Integer,
        Value::Object(_) => WarehouseType::Struct,
        Value::String(_) | Value::Array(_) | Value::Null => WarehouseType::String,
    }
}
