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

//! # Describe Port
//!
//! This Port defines what it means to "read column metadata" from the
//! relational database that backs a model. It doesn't care which database
//! answers, as long as the answer looks like `DESCRIBE <table>`.

use crate::domain::entities::ColumnRecord;
use crate::domain::errors::Result;

/// `DescribePort` returns the column list of a table.
pub trait DescribePort: Send + Sync {
    /// Columns of `table`, in table order, read through the named connection
    /// (`None` for the default one).
    fn describe(&self, connection: Option<&str>, table: &str) -> Result<Vec<ColumnRecord>>;
}
