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

//! Core error definitions for the Warehouse Bridge.
//!
//! This module provides a centralized `BridgeError` enum and a `Result` type
//! used throughout the crate to handle configuration, database, warehouse
//! and wait-policy errors.

use thiserror::Error;

/// Error types encountered while talking to the warehouse or the source database.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Schema derivation requires a model, {0} used")]
    NotAModel(String),

    #[error("Metadata discovery failed: {0}")]
    MetadataError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("BigQuery error: {0}")]
    WarehouseError(String),

    #[error("Query job {job_id} did not complete after {attempts} status checks")]
    QueryTimeout { job_id: String, attempts: u32 },

    #[error("Cancelled while {0}")]
    Cancelled(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<mysql::Error> for BridgeError {
    fn from(e: mysql::Error) -> Self {
        BridgeError::DatabaseError(e.to_string())
    }
}

impl From<r2d2::Error> for BridgeError {
    fn from(e: r2d2::Error) -> Self {
        BridgeError::DatabaseError(format!("Connection pool error: {}", e))
    }
}

/// A specialized Result type for the Warehouse Bridge.
pub type Result<T> = std::result::Result<T, BridgeError>;
