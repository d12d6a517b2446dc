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

//! Host architecture backend.
//!
//! Built on portable atomics so the whole layer runs under the host test
//! harness.  Alongside the [`ArchInterface`] implementation this module
//! carries a simulated environment (scheduler, interrupt controller,
//! spawner) that the integration tests install.

use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::arch::ArchInterface;
use crate::env::{self, Environment, InterruptController, Scheduler, TaskSpawner};
use crate::irq::{IrqAction, IrqDispatch};
use crate::kthread::ThreadContext;
use crate::sync::spinlock::{self, SpinLock};

pub struct Arch;

impl ArchInterface for Arch {
    type BareSpinLock = BareSpinLock;
    type Clock = HostClock;

    fn current_core() -> usize {
        CURRENT_CORE.load(Ordering::Relaxed)
    }

    fn wait_for_event() {
        core::hint::spin_loop();
    }
}

static CURRENT_CORE: AtomicUsize = AtomicUsize::new(0);

/// Overrides the core index reported by [`Arch::current_core`].
///
/// Process-wide, so tests that change it need their own test binary.
pub fn set_current_core(core: usize) {
    CURRENT_CORE.store(core, Ordering::Relaxed);
}

/// Millisecond-resolution clock backed by a counter that only moves when
/// [`HostClock::advance`] is called (the simulated scheduler advances it
/// on every yield).
pub struct HostClock;

static TICK: AtomicU64 = AtomicU64::new(0);

impl HostClock {
    pub fn advance(ticks: u64) {
        TICK.fetch_add(ticks, Ordering::Relaxed);
    }
}

impl ticks::Clock for HostClock {
    const TICKS_PER_SEC: u64 = 1000;

    fn now() -> ticks::Instant<Self> {
        ticks::Instant::from_ticks(TICK.load(Ordering::Relaxed))
    }
}

pub struct BareSpinLock {
    locked: AtomicBool,
}

pub struct BareSpinLockGuard<'lock> {
    lock: &'lock BareSpinLock,
}

impl Drop for BareSpinLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

impl spinlock::BareSpinLock for BareSpinLock {
    type Guard<'a> = BareSpinLockGuard<'a>;

    const NEW: Self = Self {
        locked: AtomicBool::new(false),
    };

    fn try_lock(&self) -> Option<Self::Guard<'_>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(BareSpinLockGuard { lock: self })
    }
}

/// Scheduler stand-in: a yield advances the simulated clock by one tick
/// so that timed waits make progress.
pub struct HostScheduler;

impl Scheduler for HostScheduler {
    fn yield_now(&self) {
        HostClock::advance(1);
        core::hint::spin_loop();
    }
}

/// Spawner stand-in that runs the thread function to completion on the
/// caller's stack.
pub struct HostSpawner;

impl TaskSpawner for HostSpawner {
    fn spawn(
        &self,
        name: &'static str,
        entry: crate::kthread::ThreadFn,
        ctx: ThreadContext,
    ) -> kstatus::Result<()> {
        let code = entry(ctx);
        if code != 0 {
            log::warn!("thread {} exited with code {}", name, code);
        }
        Ok(())
    }
}

const MAX_HOST_IRQS: usize = 32;

#[derive(Clone, Copy)]
struct Binding {
    irq: u32,
    entry: IrqDispatch,
    action: &'static IrqAction,
    enabled: bool,
}

/// Interrupt controller stand-in.  Bindings are recorded on `connect` and
/// replayed by [`HostInterruptController::fire`].
pub struct HostInterruptController {
    bindings: SpinLock<[Option<Binding>; MAX_HOST_IRQS]>,
}

impl HostInterruptController {
    pub const fn new() -> Self {
        Self {
            bindings: SpinLock::new([None; MAX_HOST_IRQS]),
        }
    }

    /// Simulates delivery of `irq`, returning whether a handler ran.
    /// A connected but disabled line is masked and does not dispatch.
    pub fn fire(&self, irq: u32) -> bool {
        let binding = {
            let bindings = self.bindings.lock();
            bindings
                .iter()
                .flatten()
                .find(|binding| binding.irq == irq && binding.enabled)
                .copied()
        };
        match binding {
            Some(binding) => {
                (binding.entry)(binding.action);
                true
            }
            None => false,
        }
    }

    fn set_enabled(&self, irq: u32, enabled: bool) {
        let mut bindings = self.bindings.lock();
        for binding in bindings.iter_mut().flatten() {
            if binding.irq == irq {
                binding.enabled = enabled;
            }
        }
    }
}

impl InterruptController for HostInterruptController {
    fn connect(&self, irq: u32, entry: IrqDispatch, action: &'static IrqAction) {
        let mut bindings = self.bindings.lock();
        let slot = bindings.iter_mut().find(|slot| slot.is_none());
        match slot {
            Some(slot) => {
                // Connected lines start masked; `enable` unmasks them.
                *slot = Some(Binding {
                    irq,
                    entry,
                    action,
                    enabled: false,
                });
            }
            None => kassert::bug!("host interrupt controller has no free slots"),
        }
    }

    fn enable(&self, irq: u32) {
        self.set_enabled(irq, true);
    }

    fn disable(&self, irq: u32) {
        self.set_enabled(irq, false);
    }
}

static SCHEDULER: HostScheduler = HostScheduler;
static SPAWNER: HostSpawner = HostSpawner;
static INTERRUPT_CONTROLLER: HostInterruptController = HostInterruptController::new();

/// Installs the simulated environment.  Idempotent, as [`env::install`]
/// keeps the first environment it is given.
pub fn install_host_environment() -> &'static Environment {
    env::install(Environment {
        scheduler: &SCHEDULER,
        interrupt_controller: &INTERRUPT_CONTROLLER,
        spawner: &SPAWNER,
    })
}

/// The controller wired up by [`install_host_environment`].
pub fn interrupt_controller() -> &'static HostInterruptController {
    &INTERRUPT_CONTROLLER
}
