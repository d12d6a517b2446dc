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
use std::ptr::NonNull;
use std::sync::Mutex as StdMutex;
use std::sync::MutexGuard as StdMutexGuard;

use kcompat::timer::{self, Clock, Duration, Instant, TimerContext, TimerEntry};
use ticks::Clock as _;

// The pending list is global, so the tests in this binary serialize on
// one lock and record fired ids in one log.
static TEST_LOCK: StdMutex<()> = StdMutex::new(());
static FIRED: StdMutex<Vec<u32>> = StdMutex::new(Vec::new());

fn serialize() -> StdMutexGuard<'static, ()> {
    let guard = TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // Drain whatever an earlier test left pending before starting fresh.
    timer::process(Instant::MAX);
    FIRED
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clear();
    guard
}

fn fired() -> Vec<u32> {
    FIRED
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

fn record(ctx: TimerContext) {
    let any: &dyn Any = ctx;
    let id: &u32 = any.downcast_ref().unwrap();
    FIRED
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(*id);
}

fn leak_entry(id: u32) -> NonNull<TimerEntry> {
    let id: &'static u32 = Box::leak(Box::new(id));
    NonNull::from(Box::leak(Box::new(TimerEntry::new(record, id))))
}

#[test]
fn timers_fire_in_deadline_order() {
    let _guard = serialize();

    let now = Clock::now();
    let late = leak_entry(1);
    let early = leak_entry(2);
    let middle = leak_entry(3);

    unsafe {
        timer::schedule(late, now + Duration::from_ticks(30));
        timer::schedule(early, now + Duration::from_ticks(10));
        timer::schedule(middle, now + Duration::from_ticks(20));
    }
    assert!(unsafe { early.as_ref() }.is_pending());

    // Nothing has expired yet.
    timer::process(now + Duration::from_ticks(5));
    assert_eq!(fired(), Vec::<u32>::new());

    timer::process(now + Duration::from_ticks(30));
    assert_eq!(fired(), vec![2, 3, 1]);
    assert!(!unsafe { early.as_ref() }.is_pending());
}

#[test]
fn expiry_is_inclusive() {
    let _guard = serialize();

    let now = Clock::now();
    let entry = leak_entry(7);
    unsafe { timer::schedule(entry, now + Duration::from_ticks(10)) };

    timer::process(now + Duration::from_ticks(10));
    assert_eq!(fired(), vec![7]);
}

#[test]
fn cancel_removes_a_pending_timer() {
    let _guard = serialize();

    let now = Clock::now();
    let entry = leak_entry(4);
    unsafe { timer::schedule(entry, now + Duration::from_ticks(10)) };

    assert!(unsafe { timer::cancel(entry) });
    assert!(!unsafe { entry.as_ref() }.is_pending());

    timer::process(now + Duration::from_ticks(100));
    assert_eq!(fired(), Vec::<u32>::new());

    // Cancelling a timer that is not pending reports as much.
    assert!(!unsafe { timer::cancel(entry) });
}

#[test]
fn fired_timers_can_be_rescheduled() {
    let _guard = serialize();

    let now = Clock::now();
    let entry = leak_entry(5);

    unsafe { timer::schedule(entry, now + Duration::from_ticks(1)) };
    timer::process(now + Duration::from_ticks(1));
    assert_eq!(fired(), vec![5]);

    unsafe { timer::schedule(entry, now + Duration::from_ticks(2)) };
    timer::process(now + Duration::from_ticks(2));
    assert_eq!(fired(), vec![5, 5]);
}

#[test]
#[should_panic]
fn scheduling_a_pending_timer_is_fatal() {
    let _guard = serialize();

    let now = Clock::now();
    let entry = leak_entry(6);
    unsafe {
        timer::schedule(entry, now + Duration::from_ticks(10));
        timer::schedule(entry, now + Duration::from_ticks(20));
    }
}
