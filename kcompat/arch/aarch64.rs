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

//! AArch64 architecture backend.
//!
//! Spinlock acquisition masks IRQ and FIQ via DAIF and, with the `smp`
//! feature, takes a cross-core lock with exclusive-access atomics.  The
//! saved DAIF state travels in the lock guard, so nesting restores masks
//! in LIFO order.

use core::arch::asm;
use core::sync::atomic::{Ordering, compiler_fence};

use crate::arch::ArchInterface;

pub struct Arch;

impl ArchInterface for Arch {
    type BareSpinLock = BareSpinLock;
    type Clock = CounterClock;

    fn current_core() -> usize {
        let mpidr: u64;
        unsafe {
            asm!("mrs {0}, mpidr_el1", out(reg) mpidr, options(nomem, nostack));
        }
        (mpidr & 0b11) as usize
    }

    fn wait_for_event() {
        unsafe {
            asm!("wfe", options(nomem, nostack));
        }
    }

    fn send_event() {
        unsafe {
            asm!("sev", options(nomem, nostack));
        }
    }

    fn idle() {
        unsafe {
            asm!("wfi", options(nomem, nostack));
        }
    }
}

/// Clock over the virtual counter, `cntvct_el0`.
pub struct CounterClock;

impl ticks::Clock for CounterClock {
    // CNTFRQ_EL0 on the supported boards.
    const TICKS_PER_SEC: u64 = 54_000_000;

    fn now() -> ticks::Instant<Self> {
        let count: u64;
        unsafe {
            asm!("isb", "mrs {0}, cntvct_el0", out(reg) count, options(nomem, nostack));
        }
        ticks::Instant::from_ticks(count)
    }
}

/// Masks IRQ and FIQ on the current core, restoring the previous DAIF
/// state on drop.
struct InterruptGuard {
    saved_daif: u64,
}

impl InterruptGuard {
    fn new() -> Self {
        let saved_daif: u64;
        unsafe {
            asm!(
                "mrs {0}, daif",
                "msr daifset, #0b0011",
                out(reg) saved_daif,
                options(nomem, nostack),
            );
        }
        compiler_fence(Ordering::SeqCst);
        Self { saved_daif }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        compiler_fence(Ordering::SeqCst);
        unsafe {
            asm!("msr daif, {0}", in(reg) self.saved_daif, options(nomem, nostack));
        }
    }
}

#[cfg(feature = "smp")]
mod smp_lock {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::InterruptGuard;
    use crate::arch::ArchInterface;
    use crate::sync::spinlock;

    pub struct BareSpinLock {
        locked: AtomicU32,
    }

    pub struct BareSpinLockGuard<'lock> {
        lock: &'lock BareSpinLock,
        // Dropped after the lock word is released.
        _interrupt_guard: InterruptGuard,
    }

    impl Drop for BareSpinLockGuard<'_> {
        fn drop(&mut self) {
            self.lock.locked.store(0, Ordering::Release);
            super::Arch::send_event();
        }
    }

    impl spinlock::BareSpinLock for BareSpinLock {
        type Guard<'a> = BareSpinLockGuard<'a>;

        const NEW: Self = Self {
            locked: AtomicU32::new(0),
        };

        fn try_lock(&self) -> Option<Self::Guard<'_>> {
            let interrupt_guard = InterruptGuard::new();
            match self
                .locked
                .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => Some(BareSpinLockGuard {
                    lock: self,
                    _interrupt_guard: interrupt_guard,
                }),
                // Dropping the guard here unmasks interrupts between
                // attempts, keeping IRQ latency bounded while contended.
                Err(_) => None,
            }
        }

        fn lock(&self) -> Self::Guard<'_> {
            loop {
                if let Some(guard) = self.try_lock() {
                    return guard;
                }
                super::Arch::wait_for_event();
            }
        }
    }
}

#[cfg(not(feature = "smp"))]
mod up_lock {
    use core::cell::UnsafeCell;

    use super::InterruptGuard;

    /// Uniprocessor lock: masking interrupts is sufficient for exclusion,
    /// the `bool` only catches recursive acquisition.
    pub struct BareSpinLock {
        locked: UnsafeCell<bool>,
    }

    unsafe impl Send for BareSpinLock {}
    unsafe impl Sync for BareSpinLock {}

    pub struct BareSpinLockGuard<'lock> {
        lock: &'lock BareSpinLock,
        _interrupt_guard: InterruptGuard,
    }

    impl Drop for BareSpinLockGuard<'_> {
        fn drop(&mut self) {
            unsafe { *self.lock.locked.get() = false };
        }
    }

    impl crate::sync::spinlock::BareSpinLock for BareSpinLock {
        type Guard<'a> = BareSpinLockGuard<'a>;

        const NEW: Self = Self {
            locked: UnsafeCell::new(false),
        };

        fn try_lock(&self) -> Option<Self::Guard<'_>> {
            let interrupt_guard = InterruptGuard::new();
            // Interrupts are masked, so this read-modify-write cannot be
            // preempted.
            let locked = unsafe { &mut *self.locked.get() };
            if *locked {
                return None;
            }
            *locked = true;
            Some(BareSpinLockGuard {
                lock: self,
                _interrupt_guard: interrupt_guard,
            })
        }
    }
}

#[cfg(feature = "smp")]
pub use smp_lock::BareSpinLock;
#[cfg(not(feature = "smp"))]
pub use up_lock::BareSpinLock;
