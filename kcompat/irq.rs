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

//! Interrupt registration bridge.
//!
//! Drivers register a handler against a device through
//! [`crate::device::Device::request_irq`]; this module carries the
//! registration record and the dispatch entry point the interrupt
//! controller calls back into.

use core::any::Any;

use bitflags::bitflags;

use crate::fault::Fault;

bitflags! {
    /// Handler registration flags.  Only `SHARED` is accepted; on this
    /// system every line behaves as shareable, so the flag is a no-op
    /// taken for source compatibility.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct IrqFlags: u32 {
        const SHARED = 0x0080;
    }
}

/// What a handler reports back to the dispatch layer.
///
/// Only [`Handled`](IrqReturn::Handled) is supported.  `None` would
/// require line-sharing bookkeeping and `WakeThread` a threaded-handler
/// stage, neither of which exists here; returning either is fatal so the
/// gap is caught at the first interrupt rather than silently dropped.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IrqReturn {
    None,
    Handled,
    WakeThread,
}

/// Context pointer handed back to the handler, type-erased.
pub type IrqContext = &'static (dyn Any + Sync);

pub type IrqHandler = fn(irq: u32, ctx: IrqContext) -> IrqReturn;

/// Entry point the interrupt controller invokes for a connected line.
pub type IrqDispatch = fn(action: &'static IrqAction);

/// One registered handler.  A device owns at most one.
pub struct IrqAction {
    irq: u32,
    handler: IrqHandler,
    flags: IrqFlags,
    name: &'static str,
    ctx: IrqContext,
}

impl IrqAction {
    pub(crate) fn new(
        irq: u32,
        handler: IrqHandler,
        flags: IrqFlags,
        name: &'static str,
        ctx: IrqContext,
    ) -> Self {
        Self {
            irq,
            handler,
            flags,
            name,
            ctx,
        }
    }

    pub fn irq(&self) -> u32 {
        self.irq
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn flags(&self) -> IrqFlags {
        self.flags
    }
}

/// Runs the action's handler.  Runs in interrupt context.
pub fn dispatch(action: &'static IrqAction) {
    let result = (action.handler)(action.irq, action.ctx);
    if result != IrqReturn::Handled {
        kassert::bug!(
            "{}: irq {} handler for {} returned {:?}",
            Fault::UnsupportedIrqReturn,
            action.irq,
            action.name,
            result,
        );
    }
}
