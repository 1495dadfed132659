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

//! # Runtime Context
//!
//! Builds the concrete adapters from configuration and hands them to a
//! `Bridge`. Everything created here lives for the whole process.

use crate::application::bridge::Bridge;
use crate::config::AppConfig;
use crate::domain::errors::{BridgeError, Result};
use crate::infrastructure::bigquery::rest_adapter::{check_tool_availability, BigQueryRestAdapter};
use crate::infrastructure::cache::moka_cache::MokaMetadataCache;
use crate::infrastructure::mysql::describe_adapter::MysqlDescribeAdapter;
use crate::ports::cache_port::MetadataCache;
use crate::ports::describe_port::DescribePort;
use crate::ports::warehouse_port::WarehousePort;
use log::info;
use std::sync::Arc;

/// Shared resources for the life of the app.
pub struct RuntimeContext {
    pub bridge: Bridge,
}

impl RuntimeContext {
    /// Wires the BigQuery, MySQL and cache adapters together.
    ///
    /// `check_tools` verifies that `gcloud` and `curl` are on the PATH before
    /// anything tries to call them.
    pub fn init(config: &AppConfig, check_tools: bool) -> Result<Self> {
        if check_tools {
            for tool in ["gcloud", "curl"] {
                if !check_tool_availability(tool) {
                    return Err(BridgeError::ConfigError(format!(
                        "'{}' is required but was not found on PATH",
                        tool
                    )));
                }
            }
        }

        info!(
            "Connecting to BigQuery project {} (dataset {})",
            config.bigquery.project_id, config.bigquery.default_dataset
        );
        let warehouse: Arc<dyn WarehousePort> = Arc::new(BigQueryRestAdapter::new(
            config.bigquery.project_id.clone(),
            config.bigquery.auth_file.clone(),
            config.bigquery.location.clone(),
        ));

        info!(
            "Initializing {} database connection pool(s)",
            config.database.connections.len()
        );
        let describer: Arc<dyn DescribePort> = Arc::new(MysqlDescribeAdapter::new(
            &config.database.connections,
            &config.database.default_connection,
            config.database.pool_size,
        )?);

        let cache: Arc<dyn MetadataCache> =
            Arc::new(MokaMetadataCache::new(config.cache.max_capacity));

        let bridge = Bridge::new(warehouse, describer, cache, config.bridge_settings());
        Ok(Self { bridge })
    }
}
