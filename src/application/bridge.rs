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

//! # Warehouse Bridge
//!
//! The single entry point applications use. `Bridge` wires the query
//! executor, row preparer, schema deriver and table provisioner onto one
//! warehouse port, and adds a few conveniences on top: streaming inserts
//! with terse or verbose reporting, and `max()` lookups used for
//! incremental syncs.

use crate::application::query_executor::QueryExecutor;
use crate::application::row_preparer;
use crate::application::schema_deriver::{SchemaDeriver, DEFAULT_CACHE_TTL};
use crate::application::table_provisioner::{TableProvisioner, DEFAULT_SETTLE_DELAY};
use crate::domain::entities::{
    InsertOptions, InsertOutcome, InsertReport, PreparedRow, QueryOptions, Row, SchemaField,
    StructHints, TableRef,
};
use crate::domain::errors::{BridgeError, Result};
use crate::domain::model::{Model, RowItem};
use crate::domain::wait::{CancelToken, WaitPolicy};
use crate::ports::cache_port::MetadataCache;
use crate::ports::describe_port::DescribePort;
use crate::ports::warehouse_port::WarehousePort;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Tunables read once from configuration.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub default_dataset: String,
    pub location: Option<String>,
    pub wait_policy: WaitPolicy,
    pub settle_delay: Duration,
    pub cache_ttl: Duration,
}

impl BridgeSettings {
    pub fn new(default_dataset: &str) -> Self {
        Self {
            default_dataset: default_dataset.to_string(),
            location: None,
            wait_policy: WaitPolicy::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

pub struct Bridge {
    warehouse: Arc<dyn WarehousePort>,
    deriver: Arc<SchemaDeriver>,
    executor: QueryExecutor,
    provisioner: TableProvisioner,
    default_dataset: String,
    location: Option<String>,
    cancel: CancelToken,
}

impl Bridge {
    pub fn new(
        warehouse: Arc<dyn WarehousePort>,
        describer: Arc<dyn DescribePort>,
        cache: Arc<dyn MetadataCache>,
        settings: BridgeSettings,
    ) -> Self {
        let cancel = CancelToken::new();
        let deriver = Arc::new(SchemaDeriver::new(describer, cache, settings.cache_ttl));
        let executor = QueryExecutor::new(
            warehouse.clone(),
            settings.wait_policy.clone(),
            cancel.clone(),
        );
        let provisioner = TableProvisioner::new(
            warehouse.clone(),
            deriver.clone(),
            settings.settle_delay,
            cancel.clone(),
        );

        Self {
            warehouse,
            deriver,
            executor,
            provisioner,
            default_dataset: settings.default_dataset,
            location: settings.location,
            cancel,
        }
    }

    /// Token that aborts the poll or settle wait in progress.
    ///
    /// Each `run` and `create_from_model` clears it on entry, so a cancel
    /// never carries over to later calls.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn default_dataset(&self) -> &str {
        &self.default_dataset
    }

    /// Runs a query and returns its rows.
    pub fn run(&self, query: &str, options: Option<&QueryOptions>) -> Result<Vec<Row>> {
        match options {
            Some(opts) => self.executor.run(query, Some(opts)),
            None => {
                let opts = QueryOptions {
                    location: self.location.clone(),
                    ..QueryOptions::default()
                };
                self.executor.run(query, Some(&opts))
            }
        }
    }

    /// Streams prepared rows into `table`.
    ///
    /// Terse mode yields `Success` or the flattened row errors; verbose mode
    /// always yields a report with the accepted row count.
    pub fn insert(
        &self,
        table: &TableRef,
        rows: &[PreparedRow],
        options: Option<InsertOptions>,
        verbose: bool,
    ) -> Result<InsertOutcome> {
        let options = options.unwrap_or_default();
        let response = self.warehouse.insert_rows(table, rows, &options)?;

        if response.is_successful() && !verbose {
            info!("Inserted {} rows into {}", rows.len(), table);
            return Ok(InsertOutcome::Success);
        }

        let errors: Vec<Value> = response
            .failed_rows
            .iter()
            .flat_map(|row| row.errors.iter().cloned())
            .collect();

        if !response.is_successful() {
            warn!(
                "{} of {} rows rejected by {}",
                response.failed_rows.len(),
                rows.len(),
                table
            );
        }

        if verbose {
            Ok(InsertOutcome::Report(InsertReport {
                affected_rows: rows.len().saturating_sub(response.failed_rows.len()),
                errors,
                info: response.info,
            }))
        } else {
            Ok(InsertOutcome::Failed(errors))
        }
    }

    /// Finds a table by name; `None` dataset means the default one.
    pub fn get_table(&self, table: &str, dataset: Option<&str>) -> Result<Option<TableRef>> {
        self.provisioner
            .get_table(dataset.unwrap_or(&self.default_dataset), table)
    }

    /// Converts models and mappings into insert rows.
    pub fn prepare_data<'a, I>(&self, items: I) -> Vec<PreparedRow>
    where
        I: IntoIterator<Item = RowItem<'a>>,
    {
        row_preparer::prepare(items)
    }

    /// Derives the warehouse schema of a model's table.
    pub fn flip_model(&self, model: &dyn Model, structs: Option<&StructHints>) -> Result<Vec<SchemaField>> {
        self.deriver.derive(model, structs)
    }

    /// Returns the table, creating it from `model` if it does not exist yet.
    pub fn create_from_model(
        &self,
        dataset: Option<&str>,
        table: &str,
        model: &dyn Model,
        structs: Option<&StructHints>,
        delay: bool,
    ) -> Result<TableRef> {
        self.provisioner.ensure_table(
            dataset.unwrap_or(&self.default_dataset),
            table,
            model,
            structs,
            delay,
        )
    }

    /// Largest `id` in the table.
    pub fn get_max_id(&self, table: &str, dataset: Option<&str>) -> Result<Option<Value>> {
        self.get_max_field(table, "id", dataset)
    }

    /// Latest `created_at` in the table.
    pub fn get_max_creation_date(&self, table: &str, dataset: Option<&str>) -> Result<Option<Value>> {
        self.get_max_field(table, "created_at", dataset)
    }

    /// Largest value of `field` in the table; `None` when the table is empty.
    pub fn get_max_field(&self, table: &str, field: &str, dataset: Option<&str>) -> Result<Option<Value>> {
        let dataset = dataset.unwrap_or(&self.default_dataset);
        let column = quote_identifier(field)?;
        let path = format!("{}.{}", quote_part(dataset)?, quote_part(table)?);
        let query = format!("SELECT max({column}) {column} FROM `{path}`");

        let rows = self.run(&query, None)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|mut row| row.remove(field))
            .filter(|v| !v.is_null()))
    }
}

/// Backtick-quotes an identifier.
fn quote_identifier(identifier: &str) -> Result<String> {
    Ok(format!("`{}`", quote_part(identifier)?))
}

/// Escapes an identifier for use inside backticks.
fn quote_part(identifier: &str) -> Result<String> {
    if identifier.is_empty() || identifier.chars().any(char::is_control) {
        return Err(BridgeError::ConfigError(format!(
            "Invalid identifier: {:?}",
            identifier
        )));
    }

    let mut escaped = String::with_capacity(identifier.len());
    for ch in identifier.chars() {
        match ch {
            '`' => escaped.push_str("\\`"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(ch),
        }
    }
    Ok(escaped)
}
