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

//! # kassert
//!
//! Two reporting channels for "should not happen" conditions:
//!
//! * [`bug!`], [`assert!`], [`eq!`] and [`ne!`] are fatal.  They log the
//!   source location and message through the `log` facade and then panic.
//!   Panicking is the explicit unrecoverable-error signal; on bare metal the
//!   panic handler halts the machine, on the host test harness it can be
//!   caught with `#[should_panic]`.
//! * [`warn_on!`] reports the source location without aborting and evaluates
//!   to the condition, for recoverable "should not happen" conditions.

#![no_std]

// Re-export for use by the macros in this crate.
#[doc(hidden)]
pub mod __private {
    pub use log;
}

/// Logs a fatal diagnostic with its source location and panics.
#[macro_export]
macro_rules! bug {
  ($format_string:literal $(,)?) => {{
      $crate::__private::log::error!(
          concat!("BUG at {}:{}: ", $format_string), file!(), line!());
      core::panic!($format_string)
  }};

  ($format_string:literal, $($args:expr),* $(,)?) => {{
      $crate::__private::log::error!(
          concat!("BUG at {}:{}: ", $format_string), file!(), line!(), $($args),*);
      core::panic!($format_string, $($args),*)
  }};
}

/// Fatal assertion on a boolean condition.
#[macro_export]
macro_rules! assert {
  ($condition:expr $(,)?) => {{
      if !$condition {
          $crate::bug!("assertion failed");
      }
  }};

  ($condition:expr, $($args:expr),* $(,)?) => {{
      if !$condition {
          $crate::bug!($($args),*);
      }
  }};
}

/// Fatal assertion that two expressions are equal.
#[macro_export]
macro_rules! eq {
  ($lhs:expr, $rhs:expr $(,)?) => {{
      let lhs = &$lhs;
      let rhs = &$rhs;
      if *lhs != *rhs {
          $crate::bug!("assertion failed: {:?} != {:?}", lhs, rhs);
      }
  }};
}

/// Fatal assertion that two expressions are not equal.
#[macro_export]
macro_rules! ne {
  ($lhs:expr, $rhs:expr $(,)?) => {{
      let lhs = &$lhs;
      let rhs = &$rhs;
      if *lhs == *rhs {
          $crate::bug!("assertion failed: {:?} == {:?}", lhs, rhs);
      }
  }};
}

/// Non-fatal report of a "should not happen" condition.
///
/// Logs the source location when the condition holds and evaluates to the
/// condition, so it can be used in an `if`:
///
/// ```
/// # let index = 0usize;
/// if kassert::warn_on!(index > 7) {
///     return;
/// }
/// ```
#[macro_export]
macro_rules! warn_on {
  ($condition:expr $(,)?) => {{
      let result = $condition;
      if result {
          $crate::__private::log::warn!(
              concat!("WARNING at {}:{}: ", stringify!($condition)), file!(), line!());
      }
      result
  }};

  ($condition:expr, $format_string:literal $(, $args:expr)* $(,)?) => {{
      let result = $condition;
      if result {
          $crate::__private::log::warn!(
              concat!("WARNING at {}:{}: ", $format_string),
              file!(), line!() $(, $args)*);
      }
      result
  }};
}
