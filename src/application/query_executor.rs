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

//! # Query Executor
//!
//! Submits a query, waits for the job to finish, and flattens the result
//! into rows. Waiting follows the configured `WaitPolicy`: a job that is
//! still running after `max_attempts` checks (or past the timeout) is
//! reported as `QueryTimeout` instead of blocking forever.

use crate::domain::entities::{QueryOptions, Row};
use crate::domain::errors::{BridgeError, Result};
use crate::domain::wait::{pause, CancelToken, WaitPolicy};
use crate::ports::warehouse_port::WarehousePort;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

pub struct QueryExecutor {
    warehouse: Arc<dyn WarehousePort>,
    policy: WaitPolicy,
    cancel: CancelToken,
}

impl QueryExecutor {
    pub fn new(warehouse: Arc<dyn WarehousePort>, policy: WaitPolicy, cancel: CancelToken) -> Self {
        Self {
            warehouse,
            policy,
            cancel,
        }
    }

    /// Runs `query` and returns every result row in order.
    ///
    /// `None` options mean standard SQL with the query cache disabled.
    pub fn run(&self, query: &str, options: Option<&QueryOptions>) -> Result<Vec<Row>> {
        self.cancel.reset();
        let defaults = QueryOptions::default();
        let options = options.unwrap_or(&defaults);

        let mut job = self.warehouse.submit_query(query, options)?;
        info!("Submitted query job {}", job.job_id);

        let started = Instant::now();
        let mut attempts = 0;

        while !job.complete {
            if attempts >= self.policy.max_attempts
                || self.policy.timeout.is_some_and(|t| started.elapsed() >= t)
            {
                return Err(BridgeError::QueryTimeout {
                    job_id: job.job_id,
                    attempts,
                });
            }

            pause(
                self.policy.delay_for(attempts),
                &self.cancel,
                &format!("waiting for query job {}", job.job_id),
            )?;

            job = self.warehouse.reload_job(&job)?;
            attempts += 1;
            debug!(
                "Job {} status check {}: complete={}",
                job.job_id, attempts, job.complete
            );
        }

        let rows = self.warehouse.job_rows(&job)?;
        info!("Query job {} returned {} rows", job.job_id, rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::MockWarehouse;
    use serde_json::json;
    use std::time::Duration;

    fn executor(warehouse: Arc<MockWarehouse>, max_attempts: u32) -> QueryExecutor {
        QueryExecutor::new(
            warehouse,
            WaitPolicy::fixed(Duration::ZERO, max_attempts),
            CancelToken::new(),
        )
    }

    #[test]
    fn test_polls_until_complete() {
        let mut mock = MockWarehouse::with_rows(vec![json!({"id": 1}), json!({"id": 2})]);
        mock.reloads_needed = 3;
        let warehouse = Arc::new(mock);

        let rows = executor(warehouse.clone(), 10).run("SELECT id FROM t", None).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["id"], json!(2));
        assert_eq!(warehouse.state().reloads, 3);
    }

    #[test]
    fn test_default_options() {
        let warehouse = Arc::new(MockWarehouse::new());
        executor(warehouse.clone(), 1).run("SELECT 1", None).unwrap();

        let state = warehouse.state();
        let (query, options) = &state.queries[0];
        assert_eq!(query, "SELECT 1");
        assert!(!options.use_legacy_sql);
        assert!(!options.use_query_cache);
    }

    #[test]
    fn test_empty_result_is_empty_vec() {
        let warehouse = Arc::new(MockWarehouse::new());
        let rows = executor(warehouse, 1).run("SELECT 1 LIMIT 0", None).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let mut mock = MockWarehouse::new();
        mock.reloads_needed = 100;
        let warehouse = Arc::new(mock);

        let err = executor(warehouse.clone(), 5).run("SELECT 1", None).unwrap_err();
        assert!(matches!(err, BridgeError::QueryTimeout { attempts: 5, .. }));
        assert_eq!(warehouse.state().reloads, 5);
    }

    #[test]
    fn test_timeout_budget() {
        let mut mock = MockWarehouse::new();
        mock.reloads_needed = u32::MAX;
        let mut policy = WaitPolicy::fixed(Duration::from_millis(5), u32::MAX);
        policy.timeout = Some(Duration::from_millis(20));

        let exec = QueryExecutor::new(Arc::new(mock), policy, CancelToken::new());
        let err = exec.run("SELECT 1", None).unwrap_err();
        assert!(matches!(err, BridgeError::QueryTimeout { .. }));
    }

    fn cancel_after(cancel: &CancelToken, delay: Duration) -> std::thread::JoinHandle<()> {
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            cancel.cancel();
        })
    }

    #[test]
    fn test_cancellation_stops_polling() {
        let mut mock = MockWarehouse::new();
        mock.reloads_needed = 10;
        let cancel = CancelToken::new();

        let exec = QueryExecutor::new(
            Arc::new(mock),
            WaitPolicy::fixed(Duration::from_secs(30), 10),
            cancel.clone(),
        );
        let canceller = cancel_after(&cancel, Duration::from_millis(50));
        let err = exec.run("SELECT 1", None).unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, BridgeError::Cancelled(_)));
    }

    #[test]
    fn test_query_after_cancel_runs_normally() {
        let mut mock = MockWarehouse::with_rows(vec![json!({"id": 7})]);
        mock.reloads_needed = 1;
        let cancel = CancelToken::new();
        let exec = QueryExecutor::new(
            Arc::new(mock),
            WaitPolicy::fixed(Duration::ZERO, 5),
            cancel.clone(),
        );

        cancel.cancel();
        let rows = exec.run("SELECT 1", None).unwrap();
        assert_eq!(rows[0]["id"], json!(7));
    }
}
