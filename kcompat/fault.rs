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

use core::fmt;

/// Contract violations that halt the system.
///
/// These are driver bugs, not runtime conditions.  They are reported
/// through [`kassert::bug!`] rather than returned as errors because the
/// caller cannot meaningfully recover from any of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// A blocking primitive was entered on a core with no scheduler.
    BlockingOffPrimaryCore,
    /// `request_irq` was called with flags other than `SHARED`.
    BadIrqFlags,
    /// An interrupt handler returned something other than `Handled`.
    UnsupportedIrqReturn,
    /// A primitive needed the environment before [`crate::env::install`]
    /// ran.
    EnvironmentMissing,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Fault::BlockingOffPrimaryCore => "blocking call off the primary core",
            Fault::BadIrqFlags => "unsupported IRQ flags",
            Fault::UnsupportedIrqReturn => "unsupported IRQ handler return value",
            Fault::EnvironmentMissing => "environment not installed",
        };
        f.write_str(message)
    }
}
