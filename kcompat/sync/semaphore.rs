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

use crate::env;

/// Counting semaphore.
///
/// [`acquire`] blocks by yielding and is therefore primary core only.
/// [`try_acquire`] and [`release`] never block and may be called from
/// anywhere, including interrupt context.
///
/// [`acquire`]: Semaphore::acquire
/// [`try_acquire`]: Semaphore::try_acquire
/// [`release`]: Semaphore::release
pub struct Semaphore {
    count: AtomicU32,
}

impl Semaphore {
    pub const fn new(initial_count: u32) -> Self {
        Self {
            count: AtomicU32::new(initial_count),
        }
    }

    /// Takes one unit, yielding until one is available.
    pub fn acquire(&self) {
        env::assert_primary_core();
        while !self.try_acquire() {
            env::yield_now();
        }
    }

    /// Takes one unit if any is available.
    pub fn try_acquire(&self) -> bool {
        self.count
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |count| {
                count.checked_sub(1)
            })
            .is_ok()
    }

    /// Returns one unit, waking at most one yielding acquirer.
    pub fn release(&self) {
        self.count.fetch_add(1, Ordering::Release);
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}
