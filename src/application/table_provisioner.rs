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

//! # Table Provisioner
//!
//! Finds a table by name or creates it from a model's derived schema.
//! Existing tables are returned as they are; schema changes are not applied.
//!
//! New BigQuery tables take a few seconds before they accept streaming
//! inserts, so creation is followed by a settle delay unless the caller
//! opts out.

use crate::application::schema_deriver::SchemaDeriver;
use crate::domain::entities::{StructHints, TableRef};
use crate::domain::errors::Result;
use crate::domain::model::Model;
use crate::domain::wait::{pause, CancelToken};
use crate::ports::warehouse_port::WarehousePort;
use log::info;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(10);

pub struct TableProvisioner {
    warehouse: Arc<dyn WarehousePort>,
    deriver: Arc<SchemaDeriver>,
    settle_delay: Duration,
    cancel: CancelToken,
}

impl TableProvisioner {
    pub fn new(
        warehouse: Arc<dyn WarehousePort>,
        deriver: Arc<SchemaDeriver>,
        settle_delay: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            warehouse,
            deriver,
            settle_delay,
            cancel,
        }
    }

    /// Looks a table up by exact name. Scans the whole dataset listing.
    pub fn get_table(&self, dataset: &str, table: &str) -> Result<Option<TableRef>> {
        Ok(self
            .warehouse
            .list_tables(dataset)?
            .into_iter()
            .find(|t| t.table_id == table))
    }

    /// Returns the table, creating it from `model` first if it does not exist.
    pub fn ensure_table(
        &self,
        dataset: &str,
        table: &str,
        model: &dyn Model,
        structs: Option<&StructHints>,
        delay: bool,
    ) -> Result<TableRef> {
        self.cancel.reset();
        if let Some(existing) = self.get_table(dataset, table)? {
            return Ok(existing);
        }

        let schema = self.deriver.derive(model, structs)?;
        info!(
            "Creating table {}.{} with {} columns",
            dataset,
            table,
            schema.len()
        );
        let created = self.warehouse.create_table(dataset, table, &schema)?;

        if delay && !self.settle_delay.is_zero() {
            info!(
                "Waiting {:?} for {} to become available",
                self.settle_delay, created
            );
            pause(
                self.settle_delay,
                &self.cancel,
                &format!("waiting for new table {}", created),
            )?;
        }

        Ok(created)
    }
}
