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

//! # Bounded Waiting
//!
//! The bridge blocks the calling thread in two places: while a query job is
//! running, and after a new table is created. `WaitPolicy` bounds the first
//! (interval, backoff, attempt cap, overall timeout) and `pause` makes both
//! cancellable through a shared `CancelToken`.

use crate::domain::errors::{BridgeError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Longest single sleep inside `pause`, so cancellation is noticed promptly.
const SLICE: Duration = Duration::from_millis(100);

/// Shared flag that aborts any wait in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the flag. Operations that wait call this when they start, so
    /// a cancel only affects the wait in progress.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// How long to wait between job status checks, and when to give up.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitPolicy {
    /// Delay before the first status check.
    pub interval: Duration,
    /// Multiplier applied to the delay after every check. `1.0` keeps it fixed.
    pub backoff_factor: f64,
    /// Upper bound for a single delay.
    pub max_interval: Duration,
    /// Status checks allowed before the job is reported as timed out.
    pub max_attempts: u32,
    /// Overall wall-clock budget, if any.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            backoff_factor: 1.0,
            max_interval: Duration::from_secs(5),
            max_attempts: 600,
            timeout: None,
        }
    }
}

impl WaitPolicy {
    /// Fixed-interval policy.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            backoff_factor: 1.0,
            max_interval: interval,
            max_attempts,
            timeout: None,
        }
    }

    /// Delay before status check number `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.max(1.0);
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.interval.as_secs_f64() * factor.powi(exponent);

        if !secs.is_finite() || secs >= self.max_interval.as_secs_f64() {
            self.max_interval.max(self.interval)
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

/// Sleeps for `duration`, returning `Cancelled` as soon as `cancel` is set.
///
/// `what` names the activity for the error message.
pub fn pause(duration: Duration, cancel: &CancelToken, what: &str) -> Result<()> {
    let mut remaining = duration;
    loop {
        if cancel.is_cancelled() {
            return Err(BridgeError::Cancelled(what.to_string()));
        }
        if remaining.is_zero() {
            return Ok(());
        }
        let step = remaining.min(SLICE);
        std::thread::sleep(step);
        remaining -= step;
    }
}
