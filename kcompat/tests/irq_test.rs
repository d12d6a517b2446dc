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
use std::sync::atomic::{AtomicU32, Ordering};

use kcompat::arch::host::{install_host_environment, interrupt_controller};
use kcompat::device::{PlatformDevice, Resource};
use kcompat::irq::{IrqContext, IrqFlags, IrqReturn};
use kstatus::Error;

fn leak_device(name: &'static str, irq: u32) -> &'static PlatformDevice {
    Box::leak(Box::new(PlatformDevice::new(name, &[Resource::irq(irq)])))
}

fn counting_handler(_irq: u32, ctx: IrqContext) -> IrqReturn {
    let any: &dyn Any = ctx;
    let counter: &AtomicU32 = any.downcast_ref().unwrap();
    counter.fetch_add(1, Ordering::Relaxed);
    IrqReturn::Handled
}

#[test]
fn registered_handler_runs_on_fire() {
    install_host_environment();

    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let device = leak_device("uart", 10);

    let irq = device.irq(0).unwrap();
    device
        .request_irq(irq, counting_handler, IrqFlags::SHARED, &COUNTER)
        .unwrap();

    assert!(interrupt_controller().fire(10));
    assert!(interrupt_controller().fire(10));
    assert_eq!(COUNTER.load(Ordering::Relaxed), 2);
}

#[test]
fn second_registration_is_rejected() {
    install_host_environment();

    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let device = leak_device("emmc", 11);

    device
        .request_irq(11, counting_handler, IrqFlags::SHARED, &COUNTER)
        .unwrap();
    assert_eq!(
        device.request_irq(11, counting_handler, IrqFlags::SHARED, &COUNTER),
        Err(Error::Busy)
    );
}

#[test]
fn free_irq_masks_the_line_and_keeps_the_slot() {
    install_host_environment();

    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let device = leak_device("spi", 15);

    device
        .request_irq(15, counting_handler, IrqFlags::SHARED, &COUNTER)
        .unwrap();
    assert!(interrupt_controller().fire(15));
    assert_eq!(COUNTER.load(Ordering::Relaxed), 1);

    device.free_irq();
    assert!(!interrupt_controller().fire(15));
    assert_eq!(COUNTER.load(Ordering::Relaxed), 1);

    // The registration record is not recycled.
    assert_eq!(
        device.request_irq(15, counting_handler, IrqFlags::SHARED, &COUNTER),
        Err(Error::Busy)
    );
}

#[test]
fn firing_an_unconnected_line_does_nothing() {
    install_host_environment();
    assert!(!interrupt_controller().fire(200));
}

#[test]
#[should_panic]
fn non_shared_flags_are_fatal() {
    install_host_environment();

    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let device = leak_device("badflags", 12);

    let _ = device.request_irq(12, counting_handler, IrqFlags::empty(), &COUNTER);
}

fn unhandled_handler(_irq: u32, _ctx: IrqContext) -> IrqReturn {
    IrqReturn::None
}

#[test]
#[should_panic]
fn unhandled_return_is_fatal() {
    install_host_environment();

    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let device = leak_device("unhandled", 13);

    device
        .request_irq(13, unhandled_handler, IrqFlags::SHARED, &COUNTER)
        .unwrap();
    interrupt_controller().fire(13);
}

fn wake_thread_handler(_irq: u32, _ctx: IrqContext) -> IrqReturn {
    IrqReturn::WakeThread
}

#[test]
#[should_panic]
fn wake_thread_return_is_fatal() {
    install_host_environment();

    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let device = leak_device("threaded", 14);

    device
        .request_irq(14, wake_thread_handler, IrqFlags::SHARED, &COUNTER)
        .unwrap();
    interrupt_controller().fire(14);
}
