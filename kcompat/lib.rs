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

//! Compatibility layer that lets kernel-style driver code run on a
//! cooperative, single-address-space bare-metal environment.
//!
//! The layer provides the primitives such drivers assume: spinlocks,
//! blocking synchronization, a platform device and resource model, an
//! interrupt registration bridge, coherent DMA allocation, timers and
//! kernel threads.  The environment underneath is cooperative, so every
//! blocking primitive waits by yielding to the scheduler installed via
//! [`env::install`] rather than by suspending a thread.
//!
//! Blocking calls are legal on the primary core only.  Calling one from a
//! secondary core is a fatal error, not an `Err`: secondary cores have no
//! scheduler to yield to, so the wait could never make progress.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod device;
pub mod dma;
pub mod env;
mod fault;
pub mod irq;
pub mod kthread;
pub mod sync;
pub mod timer;

pub use arch::{Arch, ArchInterface};
pub use fault::Fault;

/// The core on which the scheduler runs and blocking waits are permitted.
pub const PRIMARY_CORE: usize = 0;
