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

//! # Warehouse Port
//!
//! This Port is the contract for "the warehouse". The bridge never speaks the
//! BigQuery wire protocol itself: it submits jobs, checks on them, lists and
//! creates tables and streams rows through whatever implements
//! `WarehousePort`. The production adapter talks to the REST API; tests use
//! in-memory mocks.

use crate::domain::entities::{
    InsertOptions, InsertResponse, PreparedRow, QueryJob, QueryOptions, Row, SchemaField, TableRef,
};
use crate::domain::errors::Result;

/// `WarehousePort` covers every remote call the bridge makes.
pub trait WarehousePort: Send + Sync {
    /// Project every table handle belongs to.
    fn project_id(&self) -> &str;

    /// Submits a query and returns its job handle. The job may already be complete.
    fn submit_query(&self, query: &str, options: &QueryOptions) -> Result<QueryJob>;

    /// Re-reads the job status (one network round trip).
    fn reload_job(&self, job: &QueryJob) -> Result<QueryJob>;

    /// All result rows of a completed job, in order, across every page.
    fn job_rows(&self, job: &QueryJob) -> Result<Vec<Row>>;

    /// Every table in a dataset.
    fn list_tables(&self, dataset: &str) -> Result<Vec<TableRef>>;

    /// Creates a table with the given schema.
    fn create_table(&self, dataset: &str, table: &str, schema: &[SchemaField]) -> Result<TableRef>;

    /// Streams rows into a table.
    fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[PreparedRow],
        options: &InsertOptions,
    ) -> Result<InsertResponse>;
}
