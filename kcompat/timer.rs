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

//! One-shot timers.
//!
//! Drivers embed a [`TimerEntry`] in their own state and schedule it at
//! an absolute deadline.  Pending entries live on a global list sorted
//! by deadline; the system tick calls [`process`] to run whatever has
//! expired.

use core::any::Any;
use core::ptr::NonNull;

use list::{Link, UnsafeList, define_adapter};

use crate::arch::{Arch, ArchInterface};
use crate::sync::spinlock::SpinLock;

pub type Clock = <Arch as ArchInterface>::Clock;
pub type Instant = ticks::Instant<Clock>;
pub type Duration = ticks::Duration<Clock>;

pub type TimerContext = &'static (dyn Any + Sync);

/// Runs when the deadline expires.  Called with the pending list
/// unlocked, so the callback may schedule or cancel timers.
pub type TimerCallback = fn(ctx: TimerContext);

/// An embeddable timer.
///
/// The entry is linked into the global pending list while scheduled, so
/// it must not move or be dropped until it has fired or been cancelled.
pub struct TimerEntry {
    deadline: Instant,
    callback: TimerCallback,
    ctx: TimerContext,
    link: Link,
}

define_adapter!(pub TimerEntryAdapter => TimerEntry::link);

impl TimerEntry {
    pub const fn new(callback: TimerCallback, ctx: TimerContext) -> Self {
        Self {
            deadline: Instant::from_ticks(0),
            callback,
            ctx,
            link: Link::new(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.link.is_linked()
    }
}

struct TimerQueue {
    pending: UnsafeList<TimerEntry, TimerEntryAdapter>,
}

// The queue stores raw pointers; access is serialized by the spinlock.
unsafe impl Send for TimerQueue {}

static TIMER_QUEUE: SpinLock<TimerQueue> = SpinLock::new(TimerQueue {
    pending: UnsafeList::new(),
});

/// Schedules `entry` to fire at `deadline`.
///
/// Scheduling an already-pending entry is a fatal error; cancel it
/// first.
///
/// # Safety
/// `entry` must stay valid and pinned until its callback has run or
/// [`cancel`] has returned `true` for it.
pub unsafe fn schedule(mut entry: NonNull<TimerEntry>, deadline: Instant) {
    let mut queue = TIMER_QUEUE.lock();
    unsafe {
        kassert::assert!(
            !queue.pending.is_element_linked(entry),
            "timer already pending",
        );
        entry.as_mut().deadline = deadline;
        queue
            .pending
            .sorted_insert_by_unchecked(entry, |a, b| a.deadline.cmp(&b.deadline));
    }
}

/// Removes `entry` from the pending list.  Returns whether it was still
/// pending; `false` means the timer already fired (or was never
/// scheduled).
///
/// # Safety
/// `entry` must point to a valid [`TimerEntry`].
pub unsafe fn cancel(entry: NonNull<TimerEntry>) -> bool {
    let mut queue = TIMER_QUEUE.lock();
    unsafe { queue.pending.unlink_element(entry).is_some() }
}

/// Fires every entry whose deadline is at or before `now`.
///
/// Callbacks run with the pending list unlocked.  Called from the
/// system tick on the primary core.
pub fn process(now: Instant) {
    loop {
        let mut queue = TIMER_QUEUE.lock();
        let Some(entry) = (unsafe { queue.pending.pop_head() }) else {
            return;
        };
        let (deadline, callback, ctx) = {
            let entry_ref = unsafe { entry.as_ref() };
            (entry_ref.deadline, entry_ref.callback, entry_ref.ctx)
        };
        if deadline > now {
            // The list is sorted, nothing further along has expired.
            unsafe { queue.pending.push_front_unchecked(entry) };
            return;
        }
        drop(queue);
        callback(ctx);
    }
}

/// Convenience for [`process`] at the current time.
pub fn tick() {
    process(<Clock as ticks::Clock>::now());
}
