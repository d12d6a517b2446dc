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

use crate::sync::spinlock::BareSpinLock;

/// Architecture hooks the portable layer is built on.
///
/// Implementations are zero-sized types selected at compile time through
/// the `arch_*` features.
pub trait ArchInterface {
    /// Lowest level spinlock the architecture can offer.
    type BareSpinLock: BareSpinLock;

    /// Monotonic clock used for timers and timed waits.
    type Clock: ticks::Clock;

    /// Index of the core this code is executing on.
    fn current_core() -> usize;

    /// Pause until another core signals an event.
    ///
    /// Used in spin loops.  A no-op fallback is correct, just wasteful.
    fn wait_for_event() {}

    /// Wake cores parked in [`ArchInterface::wait_for_event`].
    fn send_event() {}

    /// Park the core until the next interrupt.
    fn idle() {}
}

#[cfg(feature = "arch_host")]
pub mod host;
#[cfg(feature = "arch_host")]
pub use host::Arch;

// The host arch takes priority so that `--all-features` builds stay
// portable.
#[cfg(all(feature = "arch_aarch64", not(feature = "arch_host")))]
pub mod aarch64;
#[cfg(all(feature = "arch_aarch64", not(feature = "arch_host")))]
pub use aarch64::Arch;
