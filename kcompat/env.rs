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

//! Hooks into the surrounding system.
//!
//! The compatibility layer does not own a scheduler, an interrupt
//! controller or a thread spawner.  The embedding system provides all
//! three through [`install`] before any driver code runs.

use spin::Once;

use crate::arch::{Arch, ArchInterface as _};
use crate::fault::Fault;
use crate::irq::{IrqAction, IrqDispatch};
use crate::kthread::{ThreadContext, ThreadFn};
use crate::PRIMARY_CORE;

/// Cooperative scheduler on the primary core.
pub trait Scheduler: Sync {
    /// Gives other tasks a chance to run.  Returns when this task is
    /// scheduled again.
    fn yield_now(&self);
}

/// Creates the threads behind [`crate::kthread::kthread_run`].
pub trait TaskSpawner: Sync {
    fn spawn(&self, name: &'static str, entry: ThreadFn, ctx: ThreadContext)
    -> kstatus::Result<()>;
}

/// Routes hardware interrupts to registered actions.
pub trait InterruptController: Sync {
    /// Arranges for `entry(action)` to be called when `irq` fires.
    fn connect(&self, irq: u32, entry: IrqDispatch, action: &'static IrqAction);

    fn enable(&self, irq: u32) {
        let _ = irq;
    }

    fn disable(&self, irq: u32) {
        let _ = irq;
    }
}

pub struct Environment {
    pub scheduler: &'static dyn Scheduler,
    pub interrupt_controller: &'static dyn InterruptController,
    pub spawner: &'static dyn TaskSpawner,
}

static ENVIRONMENT: Once<Environment> = Once::new();

/// Registers the system the layer runs on.  The first call wins; later
/// calls are reported, their argument discarded, and the already
/// installed environment returned.
pub fn install(environment: Environment) -> &'static Environment {
    let _ = kassert::warn_on!(
        ENVIRONMENT.is_completed(),
        "environment already installed, ignoring"
    );
    ENVIRONMENT.call_once(|| {
        log::info!("compatibility environment installed");
        environment
    })
}

pub(crate) fn get() -> &'static Environment {
    match ENVIRONMENT.get() {
        Some(environment) => environment,
        None => kassert::bug!("{}", Fault::EnvironmentMissing),
    }
}

pub(crate) fn yield_now() {
    get().scheduler.yield_now();
}

/// Every blocking primitive calls this on entry.
pub(crate) fn assert_primary_core() {
    let core = Arch::current_core();
    if core != PRIMARY_CORE {
        kassert::bug!("{} (core {})", Fault::BlockingOffPrimaryCore, core);
    }
}
