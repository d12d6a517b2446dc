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

use crate::arch::{Arch, ArchInterface};

/// Lowest level lock primitive an architecture provides.
///
/// Beyond mutual exclusion between cores, implementations mask
/// interrupts on the current core for the lifetime of the guard, which
/// makes the lock usable from interrupt context.
///
/// Locks are not re-entrant.  Acquiring a lock the current core already
/// holds deadlocks (or is immediate UB on the uniprocessor backend).
pub trait BareSpinLock {
    type Guard<'a>
    where
        Self: 'a;

    /// Initial, unlocked state.  An associated const rather than `new()`
    /// so implementations can be used in statics.
    const NEW: Self;

    /// Attempts a single acquisition.
    fn try_lock(&self) -> Option<Self::Guard<'_>>;

    /// Spins until the lock is acquired.
    fn lock(&self) -> Self::Guard<'_> {
        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            Arch::wait_for_event();
        }
    }
}

type ArchBareSpinLock = <Arch as ArchInterface>::BareSpinLock;

/// Spinlock-protected data.
///
/// Access is only possible through the guard returned by [`lock`] and
/// [`try_lock`], so the data can never be touched without holding the
/// lock.
///
/// [`lock`]: SpinLock::lock
/// [`try_lock`]: SpinLock::try_lock
pub struct SpinLock<T> {
    inner: ArchBareSpinLock,
    data: UnsafeCell<T>,
}

// Exclusion is guaranteed by the bare lock.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(initial_value: T) -> Self {
        Self {
            inner: ArchBareSpinLock::NEW,
            data: UnsafeCell::new(initial_value),
        }
    }

    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.inner.try_lock().map(|guard| SpinLockGuard {
            lock: self,
            _inner_guard: guard,
        })
    }

    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        SpinLockGuard {
            _inner_guard: self.inner.lock(),
            lock: self,
        }
    }
}

/// RAII guard granting access to the data.  The underlying lock is
/// released when the guard is dropped.
pub struct SpinLockGuard<'lock, T> {
    lock: &'lock SpinLock<T>,
    _inner_guard: <ArchBareSpinLock as BareSpinLock>::Guard<'lock>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}
