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
//! Moves relational model data into BigQuery: runs queries and polls them
//! to completion, prepares rows for streaming inserts, derives BigQuery
//! schemas from MySQL `DESCRIBE` output and provisions tables on demand.
//!
//! The crate follows a ports-and-adapters layout. `domain` and
//! `application` know nothing about HTTP or MySQL; `infrastructure` does.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;
