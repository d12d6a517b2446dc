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

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU32, Ordering};

use crate::env;

// Reader count in the low bits, writer flag in the top bit.
const WRITER: u32 = 1 << 31;

/// Reader-writer lock.
///
/// Readers register before checking for a writer, so a reader that loses
/// the race to a writer is already counted and the writer sees it.  The
/// lock does not arbitrate fairness; a continuous stream of readers can
/// starve a writer.  Primary core only.
pub struct RwLock<T> {
    state: AtomicU32,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for RwLock<T> {}
unsafe impl<T: Send + Sync> Sync for RwLock<T> {}

impl<T> RwLock<T> {
    pub const fn new(initial_value: T) -> Self {
        Self {
            state: AtomicU32::new(0),
            data: UnsafeCell::new(initial_value),
        }
    }

    /// Acquires shared access, yielding while a writer holds the lock.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        env::assert_primary_core();
        self.state.fetch_add(1, Ordering::Acquire);
        while self.state.load(Ordering::Acquire) & WRITER != 0 {
            env::yield_now();
        }
        RwLockReadGuard { lock: self }
    }

    /// Acquires exclusive access, yielding until the lock is idle.
    ///
    /// The writer flag is only set once no readers remain; setting it
    /// while readers are registered would deadlock against a reader
    /// yielding on that same flag.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        env::assert_primary_core();
        while self
            .state
            .compare_exchange(0, WRITER, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            env::yield_now();
        }
        RwLockWriteGuard { lock: self }
    }
}

pub struct RwLockReadGuard<'lock, T> {
    lock: &'lock RwLock<T>,
}

impl<T> Drop for RwLockReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.state.fetch_sub(1, Ordering::Release);
    }
}

impl<T> Deref for RwLockReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.data.get() }
    }
}

pub struct RwLockWriteGuard<'lock, T> {
    lock: &'lock RwLock<T>,
}

impl<T> Drop for RwLockWriteGuard<'_, T> {
    fn drop(&mut self) {
        // Readers may have registered while the writer held the lock;
        // clearing only the flag keeps their count intact.
        self.lock.state.fetch_and(!WRITER, Ordering::Release);
    }
}

impl<T> Deref for RwLockWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for RwLockWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}
