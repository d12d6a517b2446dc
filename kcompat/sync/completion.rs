// Copyright 2025 The Pigweed Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

use core::sync::atomic::{AtomicU32, Ordering};

use kstatus::Error;
use ticks::Clock as _;

use crate::env;
use crate::timer::{Clock, Duration};

// Completion count sentinel for "complete forever".
const BROADCAST: u32 = u32::MAX;

/// One-shot (or counted) event.
///
/// [`complete`] releases exactly one waiter; [`complete_all`] is sticky
/// and releases every current and future waiter until [`reinit`].
/// Completions may be signalled from interrupt context; waiting is
/// primary core only.
///
/// [`complete`]: Completion::complete
/// [`complete_all`]: Completion::complete_all
/// [`reinit`]: Completion::reinit
pub struct Completion {
    done: AtomicU32,
}

impl Completion {
    pub const fn new() -> Self {
        Self {
            done: AtomicU32::new(0),
        }
    }

    /// Yields until a completion is consumed.
    pub fn wait(&self) {
        env::assert_primary_core();
        while !self.try_consume() {
            env::yield_now();
        }
    }

    /// Like [`wait`](Completion::wait), giving up once `timeout` has
    /// elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> kstatus::Result<()> {
        env::assert_primary_core();
        let deadline = Clock::now() + timeout;
        loop {
            if self.try_consume() {
                return Ok(());
            }
            if Clock::now() >= deadline {
                return Err(Error::TimedOut);
            }
            env::yield_now();
        }
    }

    pub fn wait_timeout_ms(&self, timeout_ms: u32) -> kstatus::Result<()> {
        self.wait_timeout(Duration::from_millis(timeout_ms as i64))
    }

    /// Consumes a pending completion without blocking.
    pub fn try_wait(&self) -> bool {
        self.try_consume()
    }

    /// Whether a wait would return immediately.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire) != 0
    }

    /// Signals one waiter.
    pub fn complete(&self) {
        // Saturates at the broadcast sentinel rather than wrapping to 0.
        let _ = self
            .done
            .fetch_update(Ordering::Release, Ordering::Relaxed, |done| {
                (done < BROADCAST - 1).then_some(done + 1)
            });
    }

    /// Signals all waiters, present and future.
    pub fn complete_all(&self) {
        self.done.store(BROADCAST, Ordering::Release);
    }

    /// Returns to the initial, not-completed state.
    ///
    /// Only sound once no task is waiting on the previous generation.
    pub fn reinit(&self) {
        self.done.store(0, Ordering::Release);
    }

    fn try_consume(&self) -> bool {
        self.done
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |done| match done {
                0 => None,
                BROADCAST => Some(BROADCAST),
                done => Some(done - 1),
            })
            .is_ok()
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}
