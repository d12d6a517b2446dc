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

//! Synchronization primitives.
//!
//! [`SpinLock`] is the only primitive usable from interrupt context or a
//! secondary core.  The blocking primitives wait by yielding to the
//! cooperative scheduler and are therefore restricted to the primary
//! core; entering one anywhere else is fatal.

pub mod completion;
pub mod mutex;
pub mod rwlock;
pub mod semaphore;
pub mod spinlock;

pub use completion::Completion;
pub use mutex::{Mutex, MutexGuard};
pub use rwlock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use semaphore::Semaphore;
pub use spinlock::{SpinLock, SpinLockGuard};
