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

//! Kernel thread bridge.
//!
//! Maps the kernel-style "spawn a named thread running this function"
//! call onto whatever task abstraction the embedding system installed.

use core::any::Any;

use crate::env;

pub type ThreadContext = &'static (dyn Any + Sync);

/// Thread body.  The return code is advisory; a nonzero exit is logged
/// by the environment but not otherwise acted on.
pub type ThreadFn = fn(ctx: ThreadContext) -> i32;

/// Starts a named cooperative thread running `entry`.
pub fn kthread_run(name: &'static str, entry: ThreadFn, ctx: ThreadContext) -> kstatus::Result<()> {
    log::debug!("starting kernel thread {}", name);
    env::get().spawner.spawn(name, entry, ctx)
}
