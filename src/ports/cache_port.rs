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

//! # Metadata Cache Port
//!
//! Table metadata rarely changes, so describe results are kept for days.
//! The cache is injected into the schema deriver instead of living in a
//! global, which keeps tests isolated and lets callers share or drop it.

use crate::domain::entities::ColumnRecord;
use std::time::Duration;

/// Keyed store for describe results with per-entry time-to-live.
pub trait MetadataCache: Send + Sync {
    /// Live entry for `key`, if any.
    fn get(&self, key: &str) -> Option<Vec<ColumnRecord>>;

    /// Stores `columns` under `key` for `ttl`. Later writes replace earlier ones.
    fn put(&self, key: &str, columns: Vec<ColumnRecord>, ttl: Duration);
}
