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

use mysql::prelude::Queryable;
use mysql::{Conn, Error, Opts};
use r2d2::ManageConnection;

/// R2D2 connection manager for MySQL connections.
#[derive(Debug)]
pub struct MysqlConnectionManager {
    opts: Opts,
}

impl MysqlConnectionManager {
    pub fn new(opts: Opts) -> Self {
        Self { opts }
    }
}

impl ManageConnection for MysqlConnectionManager {
    type Connection = Conn;
    type Error = Error;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        Conn::new(self.opts.clone())
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.query_drop("SELECT 1")
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
