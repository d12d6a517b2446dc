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

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

use kcompat::arch::host::install_host_environment;
use kcompat::kthread::{ThreadContext, kthread_run};

fn entry(ctx: ThreadContext) -> i32 {
    let any: &dyn Any = ctx;
    let ran: &AtomicBool = any.downcast_ref().unwrap();
    ran.store(true, Ordering::Release);
    0
}

#[test]
fn spawned_thread_runs_with_its_context() {
    install_host_environment();

    static RAN: AtomicBool = AtomicBool::new(false);
    assert_eq!(kthread_run("worker", entry, &RAN), Ok(()));
    assert!(RAN.load(Ordering::Acquire));
}
