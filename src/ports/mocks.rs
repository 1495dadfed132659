//! In-memory port implementations shared by the application tests.

use crate::domain::entities::{
    ColumnRecord, FailedRow, InsertOptions, InsertResponse, PreparedRow, QueryJob, QueryOptions,
    Row, SchemaField, TableRef,
};
use crate::domain::errors::{BridgeError, Result};
use crate::ports::cache_port::MetadataCache;
use crate::ports::describe_port::DescribePort;
use crate::ports::warehouse_port::WarehousePort;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const PROJECT: &str = "test-project";

#[derive(Default)]
pub struct WarehouseState {
    pub tables: Vec<TableRef>,
    pub created: Vec<(TableRef, Vec<SchemaField>)>,
    pub queries: Vec<(String, QueryOptions)>,
    pub reloads: u32,
    pub inserted: Vec<(TableRef, Vec<PreparedRow>, InsertOptions)>,
}

/// Warehouse whose jobs complete after `reloads_needed` status checks.
pub struct MockWarehouse {
    pub state: Mutex<WarehouseState>,
    pub reloads_needed: u32,
    pub rows: Vec<Row>,
    /// Row index -> error messages returned by `insert_rows`.
    pub rejections: HashMap<usize, Vec<String>>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WarehouseState::default()),
            reloads_needed: 0,
            rows: Vec::new(),
            rejections: HashMap::new(),
        }
    }

    pub fn with_rows(rows: Vec<Value>) -> Self {
        let mut mock = Self::new();
        mock.rows = rows
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap_or_default())
            .collect();
        mock
    }

    pub fn with_table(self, dataset: &str, table: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .tables
            .push(TableRef::new(PROJECT, dataset, table));
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, WarehouseState> {
        self.state.lock().unwrap()
    }
}

impl WarehousePort for MockWarehouse {
    fn project_id(&self) -> &str {
        PROJECT
    }

    fn submit_query(&self, query: &str, options: &QueryOptions) -> Result<QueryJob> {
        self.state()
            .queries
            .push((query.to_string(), options.clone()));
        Ok(QueryJob {
            job_id: "job_1".to_string(),
            location: options.location.clone(),
            complete: self.reloads_needed == 0,
        })
    }

    fn reload_job(&self, job: &QueryJob) -> Result<QueryJob> {
        let mut state = self.state();
        state.reloads += 1;
        Ok(QueryJob {
            complete: state.reloads >= self.reloads_needed,
            ..job.clone()
        })
    }

    fn job_rows(&self, job: &QueryJob) -> Result<Vec<Row>> {
        if !job.complete {
            return Err(BridgeError::WarehouseError("job not complete".into()));
        }
        Ok(self.rows.clone())
    }

    fn list_tables(&self, dataset: &str) -> Result<Vec<TableRef>> {
        Ok(self
            .state()
            .tables
            .iter()
            .filter(|t| t.dataset_id == dataset)
            .cloned()
            .collect())
    }

    fn create_table(&self, dataset: &str, table: &str, schema: &[SchemaField]) -> Result<TableRef> {
        let table_ref = TableRef::new(PROJECT, dataset, table);
        let mut state = self.state();
        state.tables.push(table_ref.clone());
        state.created.push((table_ref.clone(), schema.to_vec()));
        Ok(table_ref)
    }

    fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[PreparedRow],
        options: &InsertOptions,
    ) -> Result<InsertResponse> {
        self.state()
            .inserted
            .push((table.clone(), rows.to_vec(), *options));

        let mut failed_rows: Vec<FailedRow> = self
            .rejections
            .iter()
            .filter(|(index, _)| **index < rows.len())
            .map(|(index, messages)| FailedRow {
                index: *index,
                errors: messages
                    .iter()
                    .map(|m| json!({"reason": "invalid", "message": m}))
                    .collect(),
            })
            .collect();
        failed_rows.sort_by_key(|f| f.index);

        Ok(InsertResponse {
            failed_rows,
            info: json!({"kind": "bigquery#tableDataInsertAllResponse"}),
        })
    }
}

/// Describer backed by a table -> columns map, counting calls.
pub struct MockDescriber {
    pub tables: HashMap<String, Vec<ColumnRecord>>,
    pub calls: Mutex<Vec<(Option<String>, String)>>,
}

impl MockDescriber {
    pub fn new(table: &str, columns: Vec<ColumnRecord>) -> Self {
        let mut tables = HashMap::new();
        tables.insert(table.to_string(), columns);
        Self {
            tables,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DescribePort for MockDescriber {
    fn describe(&self, connection: Option<&str>, table: &str) -> Result<Vec<ColumnRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push((connection.map(str::to_string), table.to_string()));
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| BridgeError::MetadataError(format!("Table '{}' doesn't exist", table)))
    }
}

/// Cache that ignores expiry but remembers the TTL it was given.
#[derive(Default)]
pub struct MemoryCache {
    pub entries: Mutex<HashMap<String, (Vec<ColumnRecord>, Duration)>>,
}

impl MetadataCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<ColumnRecord>> {
        self.entries.lock().unwrap().get(key).map(|(c, _)| c.clone())
    }

    fn put(&self, key: &str, columns: Vec<ColumnRecord>, ttl: Duration) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (columns, ttl));
    }
}

/// Columns of the `orders` table used across tests.
pub fn orders_columns() -> Vec<ColumnRecord> {
    vec![
        ColumnRecord::new("id", "int(10) unsigned", "NO"),
        ColumnRecord::new("total", "decimal(10,2)", "YES"),
        ColumnRecord::new("meta", "json", "NO"),
    ]
}
