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

//! Platform device and resource model.
//!
//! Devices are not discovered; the board bring-up code declares each
//! [`PlatformDevice`] with a fixed table of memory, interrupt and DMA
//! resources, and driver probe code looks resources up by type and
//! index.

use core::any::Any;

use bitflags::bitflags;
use kstatus::Error;
use spin::Once;

use crate::dma::{CoherentAllocation, CoherentWindow};
use crate::env;
use crate::fault::Fault;
use crate::irq::{self, IrqAction, IrqContext, IrqFlags, IrqHandler};

bitflags! {
    /// Resource type bits, using the conventional encoding driver code
    /// expects.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct ResourceFlags: u32 {
        const MEM = 0x0200;
        const IRQ = 0x0400;
        const DMA = 0x0800;
    }
}

/// One entry in a device's resource table.
///
/// For `MEM` resources `start..=end` is a physical address range.  For
/// `IRQ` resources the line number is carried in `start` (and `end`
/// equals `start`).
#[derive(Clone, Copy, Debug)]
pub struct Resource {
    pub start: usize,
    pub end: usize,
    pub flags: ResourceFlags,
}

impl Resource {
    pub const fn new(start: usize, end: usize, flags: ResourceFlags) -> Self {
        Self { start, end, flags }
    }

    pub const fn mem(start: usize, end: usize) -> Self {
        Self::new(start, end, ResourceFlags::MEM)
    }

    pub const fn irq(line: u32) -> Self {
        Self::new(line as usize, line as usize, ResourceFlags::IRQ)
    }

    const EMPTY: Self = Self::new(0, 0, ResourceFlags::empty());

    /// Size of the range in bytes, saturating for a resource spanning
    /// the whole address space.
    pub const fn len(&self) -> usize {
        (self.end - self.start).saturating_add(1)
    }

    pub const fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

pub const MAX_RESOURCES: usize = 8;

/// Driver-facing state shared by all device kinds: the driver's private
/// data slot, the coherent DMA window and the interrupt registration.
pub struct Device {
    driver_data: Once<&'static (dyn Any + Sync)>,
    coherent: Option<CoherentWindow>,
    action: Once<IrqAction>,
}

impl Device {
    fn new(coherent: Option<CoherentWindow>) -> Self {
        Self {
            driver_data: Once::new(),
            coherent,
            action: Once::new(),
        }
    }

    /// Stores the driver's private data.  Write-once; a second store is
    /// reported and ignored.
    pub fn set_driver_data<T: Any + Sync>(&self, data: &'static T) {
        if kassert::warn_on!(self.driver_data.is_completed(), "driver data already set") {
            return;
        }
        self.driver_data.call_once(|| data);
    }

    /// Returns the driver's private data, or `None` if it was never set
    /// or was set with a different type.
    pub fn driver_data<T: Any>(&self) -> Option<&'static T> {
        let any: &'static dyn Any = *self.driver_data.get()?;
        any.downcast_ref()
    }

    /// Registers `handler` for interrupt line `irq`.
    ///
    /// `flags` must be exactly `SHARED`; anything else is a fatal error
    /// since no other semantics are implemented.  A device holds at most
    /// one registration, a second attempt fails with `Busy`.
    pub fn request_irq(
        &'static self,
        irq: u32,
        handler: IrqHandler,
        flags: IrqFlags,
        name: &'static str,
        ctx: IrqContext,
    ) -> kstatus::Result<()> {
        if flags != IrqFlags::SHARED {
            kassert::bug!("{}: {:?} for {}", Fault::BadIrqFlags, flags, name);
        }
        if self.action.is_completed() {
            return Err(Error::Busy);
        }
        let action = self
            .action
            .call_once(|| IrqAction::new(irq, handler, flags, name, ctx));

        let environment = env::get();
        environment
            .interrupt_controller
            .connect(irq, irq::dispatch, action);
        environment.interrupt_controller.enable(irq);
        log::info!("irq {} connected for {}", irq, name);
        Ok(())
    }

    /// Unregisters and masks the device's interrupt, if any.
    ///
    /// The registration record itself stays allocated; a later
    /// `request_irq` on this device still fails with `Busy`.
    pub fn free_irq(&self) {
        if let Some(action) = self.action.get() {
            env::get().interrupt_controller.disable(action.irq());
        }
    }

    /// Carves a buffer out of the device's coherent window.
    pub fn alloc_coherent(&self, size: usize) -> kstatus::Result<CoherentAllocation> {
        match &self.coherent {
            Some(window) => window.alloc(size),
            None => Err(Error::OutOfMemory),
        }
    }
}

/// A memory-mapped peripheral with a static resource table.
pub struct PlatformDevice {
    name: &'static str,
    dev: Device,
    resources: [Resource; MAX_RESOURCES],
    num_resources: usize,
}

impl PlatformDevice {
    /// Declares a device.  More than [`MAX_RESOURCES`] resources, or a
    /// resource with `start > end`, is a fatal declaration error.
    pub fn new(name: &'static str, resources: &[Resource]) -> Self {
        kassert::assert!(
            resources.len() <= MAX_RESOURCES,
            "{}: too many resources ({})",
            name,
            resources.len(),
        );
        let mut table = [Resource::EMPTY; MAX_RESOURCES];
        for (slot, resource) in table.iter_mut().zip(resources) {
            kassert::assert!(
                resource.start <= resource.end,
                "{}: inverted resource range",
                name,
            );
            *slot = *resource;
        }
        Self {
            name,
            dev: Device::new(None),
            resources: table,
            num_resources: resources.len(),
        }
    }

    /// Attaches a coherent DMA window, making `alloc_coherent` usable.
    pub fn with_coherent_window(mut self, window: CoherentWindow) -> Self {
        self.dev.coherent = Some(window);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dev(&self) -> &Device {
        &self.dev
    }

    /// The `index`-th resource whose flags contain `mask`.
    pub fn resource(&self, mask: ResourceFlags, index: usize) -> Option<&Resource> {
        self.resources[..self.num_resources]
            .iter()
            .filter(|resource| resource.flags.contains(mask))
            .nth(index)
    }

    /// The `index`-th interrupt line, as a line number.
    pub fn irq(&self, index: usize) -> kstatus::Result<u32> {
        self.resource(ResourceFlags::IRQ, index)
            .map(|resource| resource.start as u32)
            .ok_or(Error::NotFound)
    }

    pub fn set_driver_data<T: Any + Sync>(&self, data: &'static T) {
        self.dev.set_driver_data(data);
    }

    pub fn driver_data<T: Any>(&self) -> Option<&'static T> {
        self.dev.driver_data()
    }

    pub fn request_irq(
        &'static self,
        irq: u32,
        handler: IrqHandler,
        flags: IrqFlags,
        ctx: IrqContext,
    ) -> kstatus::Result<()> {
        self.dev.request_irq(irq, handler, flags, self.name, ctx)
    }

    pub fn free_irq(&self) {
        self.dev.free_irq();
    }

    pub fn alloc_coherent(&self, size: usize) -> kstatus::Result<CoherentAllocation> {
        self.dev.alloc_coherent(size)
    }
}
