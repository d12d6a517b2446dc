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

//! # kstatus
//!
//! Error types for the kernel-compatibility layer.  The discriminants carry
//! errno values so that code written against the driver ABI's negative error
//! code convention keeps working: `Error::errno()` returns the negated value
//! and the [`ErrnoCode`] trait collapses a `Result` into `0` or a negative
//! code at the ABI boundary.
//!
//! # Example
//!
//! ```
//! use kstatus::{Error, ErrnoCode, Result};
//!
//! fn lookup(index: usize) -> Result<u32> {
//!     if index > 0 { Err(Error::NotFound) } else { Ok(17) }
//! }
//!
//! assert_eq!(lookup(0).errno_code(), 0);
//! assert_eq!(lookup(1).errno_code(), -6);
//! ```

#![no_std]

/// Code for "no error" at the ABI boundary.
pub const OK: i32 = 0;

/// Error type whose discriminants are positive errno values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum Error {
    /// Operation not permitted (EPERM).
    NotPermitted = 1,
    /// No such device or address (ENXIO).
    NotFound = 6,
    /// Try again; the resource is transiently unavailable (EAGAIN).
    WouldBlock = 11,
    /// Out of memory (ENOMEM).
    OutOfMemory = 12,
    /// Device or resource busy (EBUSY).
    Busy = 16,
    /// Invalid argument (EINVAL).
    InvalidArgument = 22,
    /// Operation not supported (EOPNOTSUPP).
    Unsupported = 95,
    /// Connection timed out (ETIMEDOUT).
    TimedOut = 110,
}

impl Error {
    /// Returns the negative errno value for this error.
    #[must_use]
    pub const fn errno(self) -> i32 {
        -(self as i32)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Error::NotPermitted => "not permitted",
            Error::NotFound => "not found",
            Error::WouldBlock => "would block",
            Error::OutOfMemory => "out of memory",
            Error::Busy => "busy",
            Error::InvalidArgument => "invalid argument",
            Error::Unsupported => "unsupported",
            Error::TimedOut => "timed out",
        };
        write!(f, "{} ({})", name, self.errno())
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Convert a `Result` into an errno-style status code.
pub trait ErrnoCode {
    /// Returns `0` on success and a negative errno value on failure.
    fn errno_code(self) -> i32;
}

impl<T> ErrnoCode for Result<T> {
    fn errno_code(self) -> i32 {
        match self {
            Ok(_) => OK,
            Err(e) => e.errno(),
        }
    }
}
