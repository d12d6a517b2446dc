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

//! Tick-based time keeping.
//!
//! [`Instant`] and [`Duration`] are expressed in ticks of a [`Clock`], which
//! the architecture backend provides.  Durations are signed so that instant
//! subtraction is well defined in either direction.

#![no_std]

use core::marker::PhantomData;
use core::ops::{Add, Sub};

pub trait Clock: Sized {
    /// Tick rate of this clock.
    const TICKS_PER_SEC: u64;

    fn now() -> Instant<Self>;
}

/// A point in time, measured in ticks of `C` since an arbitrary epoch.
pub struct Instant<C: Clock> {
    ticks: u64,
    _phantom: PhantomData<C>,
}

impl<C: Clock> Instant<C> {
    pub const MAX: Self = Self::from_ticks(u64::MAX);
    pub const MIN: Self = Self::from_ticks(u64::MIN);

    #[must_use]
    pub const fn from_ticks(ticks: u64) -> Self {
        Self {
            ticks,
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub const fn checked_add_duration(self, duration: Duration<C>) -> Option<Self> {
        match self.ticks.checked_add_signed(duration.ticks) {
            Some(ticks) => Some(Self::from_ticks(ticks)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_sub_duration(self, duration: Duration<C>) -> Option<Self> {
        match duration.ticks.checked_neg() {
            Some(negated) => match self.ticks.checked_add_signed(negated) {
                Some(ticks) => Some(Self::from_ticks(ticks)),
                None => None,
            },
            None => None,
        }
    }
}

// Manually implement Copy/Clone/Ord/Eq so that `C` is not required to
// implement them.
impl<C: Clock> Copy for Instant<C> {}

impl<C: Clock> Clone for Instant<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Clock> Ord for Instant<C> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.ticks.cmp(&other.ticks)
    }
}

impl<C: Clock> PartialOrd for Instant<C> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Clock> Eq for Instant<C> {}

impl<C: Clock> PartialEq for Instant<C> {
    fn eq(&self, other: &Self) -> bool {
        self.ticks == other.ticks
    }
}

impl<C: Clock> core::fmt::Debug for Instant<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Instant({})", self.ticks)
    }
}

impl<C: Clock> Sub<Instant<C>> for Instant<C> {
    type Output = Duration<C>;

    fn sub(self, rhs: Instant<C>) -> Self::Output {
        // Wrapping subtraction keeps the full resolution for large tick
        // values; the cast makes the direction signed.
        Duration::from_ticks(self.ticks.wrapping_sub(rhs.ticks) as i64)
    }
}

impl<C: Clock> Add<Duration<C>> for Instant<C> {
    type Output = Instant<C>;

    fn add(self, rhs: Duration<C>) -> Self::Output {
        let Some(instant) = self.checked_add_duration(rhs) else {
            kassert::bug!("Instant + Duration overflow");
        };
        instant
    }
}

impl<C: Clock> Sub<Duration<C>> for Instant<C> {
    type Output = Instant<C>;

    fn sub(self, rhs: Duration<C>) -> Self::Output {
        let Some(instant) = self.checked_sub_duration(rhs) else {
            kassert::bug!("Instant - Duration overflow");
        };
        instant
    }
}

/// A signed span of time in ticks of `C`.
pub struct Duration<C: Clock> {
    ticks: i64,
    _phantom: PhantomData<C>,
}

impl<C: Clock> Duration<C> {
    pub const MAX: Self = Self::from_ticks(i64::MAX);
    pub const MIN: Self = Self::from_ticks(i64::MIN);

    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self {
            ticks,
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.ticks
    }

    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self::from_ticks(secs * C::TICKS_PER_SEC as i64)
    }

    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self::from_ticks(millis * C::TICKS_PER_SEC as i64 / 1000)
    }

    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.ticks.checked_add(rhs.ticks) {
            Some(ticks) => Some(Self::from_ticks(ticks)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.ticks.checked_sub(rhs.ticks) {
            Some(ticks) => Some(Self::from_ticks(ticks)),
            None => None,
        }
    }
}

// Manually implement Copy/Clone/Ord/Eq so that `C` is not required to
// implement them.
impl<C: Clock> Copy for Duration<C> {}

impl<C: Clock> Clone for Duration<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Clock> Ord for Duration<C> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.ticks.cmp(&other.ticks)
    }
}

impl<C: Clock> PartialOrd for Duration<C> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Clock> Eq for Duration<C> {}

impl<C: Clock> PartialEq for Duration<C> {
    fn eq(&self, other: &Self) -> bool {
        self.ticks == other.ticks
    }
}

impl<C: Clock> core::fmt::Debug for Duration<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Duration({})", self.ticks)
    }
}

impl<C: Clock> Add<Duration<C>> for Duration<C> {
    type Output = Duration<C>;

    fn add(self, rhs: Duration<C>) -> Self::Output {
        let Some(duration) = self.checked_add(rhs) else {
            kassert::bug!("Duration addition overflow");
        };
        duration
    }
}

impl<C: Clock> Sub<Duration<C>> for Duration<C> {
    type Output = Duration<C>;

    fn sub(self, rhs: Duration<C>) -> Self::Output {
        let Some(duration) = self.checked_sub(rhs) else {
            kassert::bug!("Duration subtraction overflow");
        };
        duration
    }
}
