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

//! Coherent DMA allocation.
//!
//! Each DMA-capable device is assigned a fixed window of uncached memory
//! at bring-up.  Allocations bump-allocate out of that window and are
//! never returned; drivers allocate their coherent buffers once at probe
//! time.

use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use kstatus::Error;

/// Every allocation starts on a cache line boundary so that flushes of
/// neighbouring data cannot touch it.
pub const COHERENT_ALIGN: usize = 64;

/// A device's window of coherent memory.
///
/// `cpu_base` is where the CPU sees the window; `bus_base` is the same
/// window as addressed by the device.
pub struct CoherentWindow {
    cpu_base: usize,
    bus_base: usize,
    size: usize,
    used: AtomicUsize,
}

impl CoherentWindow {
    pub fn new(cpu_base: usize, bus_base: usize, size: usize) -> Self {
        kassert::ne!(cpu_base, 0);
        kassert::eq!(cpu_base % COHERENT_ALIGN, 0);
        Self {
            cpu_base,
            bus_base,
            size,
            used: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bytes still available, ignoring alignment padding of a future
    /// allocation.
    pub fn remaining(&self) -> usize {
        self.size - self.used.load(Ordering::Relaxed).min(self.size)
    }

    pub(crate) fn alloc(&self, size: usize) -> kstatus::Result<CoherentAllocation> {
        if size == 0 {
            return Err(Error::InvalidArgument);
        }
        let watermark = self
            .used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                align_up(used)
                    .checked_add(size)
                    .filter(|new_used| *new_used <= self.size)
            })
            .map_err(|_| Error::OutOfMemory)?;
        let offset = align_up(watermark);

        let Some(cpu) = NonNull::new((self.cpu_base + offset) as *mut u8) else {
            // Unreachable: the base is asserted non-zero.
            return Err(Error::OutOfMemory);
        };
        Ok(CoherentAllocation {
            cpu,
            bus_addr: self.bus_base + offset,
            size,
        })
    }
}

const fn align_up(value: usize) -> usize {
    (value + COHERENT_ALIGN - 1) & !(COHERENT_ALIGN - 1)
}

/// A live coherent buffer.
///
/// The CPU-visible pointer and the bus address refer to the same bytes;
/// the bus address is what gets programmed into device registers.
pub struct CoherentAllocation {
    cpu: NonNull<u8>,
    bus_addr: usize,
    size: usize,
}

// The allocation is plain memory; the window hands each range out once.
unsafe impl Send for CoherentAllocation {}
unsafe impl Sync for CoherentAllocation {}

impl CoherentAllocation {
    pub fn as_ptr(&self) -> *mut u8 {
        self.cpu.as_ptr()
    }

    pub fn cpu_addr(&self) -> usize {
        self.cpu.as_ptr() as usize
    }

    pub fn bus_addr(&self) -> usize {
        self.bus_addr
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
