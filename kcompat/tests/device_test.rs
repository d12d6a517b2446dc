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

use kcompat::device::{PlatformDevice, Resource, ResourceFlags};
use kcompat::dma::{COHERENT_ALIGN, CoherentWindow};
use kstatus::Error;

fn sample_device() -> PlatformDevice {
    PlatformDevice::new(
        "sample",
        &[
            Resource::mem(0x1000, 0x1fff),
            Resource::irq(5),
            Resource::irq(9),
        ],
    )
}

#[test]
fn resources_are_found_by_type_and_index() {
    let device = sample_device();

    let mem = device.resource(ResourceFlags::MEM, 0).unwrap();
    assert_eq!(mem.start, 0x1000);
    assert_eq!(mem.end, 0x1fff);
    assert_eq!(mem.len(), 0x1000);

    let first_irq = device.resource(ResourceFlags::IRQ, 0).unwrap();
    assert_eq!(first_irq.start, 5);
    let second_irq = device.resource(ResourceFlags::IRQ, 1).unwrap();
    assert_eq!(second_irq.start, 9);

    assert!(device.resource(ResourceFlags::MEM, 1).is_none());
    assert!(device.resource(ResourceFlags::DMA, 0).is_none());
}

#[test]
fn full_address_space_resource_has_a_length() {
    let resource = Resource::new(0, usize::MAX, ResourceFlags::MEM);
    assert_eq!(resource.len(), usize::MAX);
}

#[test]
fn irq_lookup_reports_missing_lines() {
    let device = sample_device();

    assert_eq!(device.irq(0), Ok(5));
    assert_eq!(device.irq(1), Ok(9));
    assert_eq!(device.irq(2), Err(Error::NotFound));
    assert_eq!(Error::NotFound.errno(), -6);
}

#[test]
fn driver_data_is_typed() {
    struct DriverState {
        value: u32,
    }

    let device: &'static PlatformDevice = Box::leak(Box::new(sample_device()));
    assert!(device.driver_data::<DriverState>().is_none());

    let state: &'static DriverState = Box::leak(Box::new(DriverState { value: 99 }));
    device.set_driver_data(state);

    assert_eq!(device.driver_data::<DriverState>().unwrap().value, 99);
    // A lookup with the wrong type misses instead of aliasing.
    assert!(device.driver_data::<u32>().is_none());
}

#[repr(align(64))]
struct WindowBacking([u8; 4096]);

#[test]
fn coherent_allocations_bump_within_the_window() {
    static BACKING: WindowBacking = WindowBacking([0; 4096]);

    let cpu_base = BACKING.0.as_ptr() as usize;
    let bus_base = 0xc000_0000;
    let device = sample_device()
        .with_coherent_window(CoherentWindow::new(cpu_base, bus_base, BACKING.0.len()));

    let first = device.alloc_coherent(100).unwrap();
    assert_eq!(first.cpu_addr(), cpu_base);
    assert_eq!(first.bus_addr(), bus_base);
    assert_eq!(first.len(), 100);

    // The next allocation starts on the following cache line.
    let second = device.alloc_coherent(100).unwrap();
    assert_eq!(second.cpu_addr(), cpu_base + 2 * COHERENT_ALIGN);
    assert_eq!(second.bus_addr() - bus_base, second.cpu_addr() - cpu_base);
}

#[test]
fn coherent_allocation_fails_when_exhausted() {
    static BACKING: WindowBacking = WindowBacking([0; 4096]);

    let cpu_base = BACKING.0.as_ptr() as usize;
    let device =
        sample_device().with_coherent_window(CoherentWindow::new(cpu_base, 0xc000_0000, 4096));

    assert_eq!(
        device.alloc_coherent(4097).map(|_| ()),
        Err(Error::OutOfMemory)
    );
    assert!(device.alloc_coherent(4096).is_ok());
    // The window is fully consumed.
    assert_eq!(device.alloc_coherent(1).map(|_| ()), Err(Error::OutOfMemory));
}

#[test]
fn zero_sized_allocations_are_rejected() {
    static BACKING: WindowBacking = WindowBacking([0; 4096]);

    let device = sample_device().with_coherent_window(CoherentWindow::new(
        BACKING.0.as_ptr() as usize,
        0xc000_0000,
        4096,
    ));

    assert_eq!(
        device.alloc_coherent(0).map(|_| ()),
        Err(Error::InvalidArgument)
    );
}

#[test]
fn devices_without_a_window_cannot_allocate() {
    let device = sample_device();
    assert_eq!(device.alloc_coherent(64).map(|_| ()), Err(Error::OutOfMemory));
}

#[test]
#[should_panic]
fn too_many_resources_is_fatal() {
    let resources = [Resource::irq(1); 9];
    let _ = PlatformDevice::new("overfull", &resources);
}

#[test]
#[should_panic]
fn inverted_resource_range_is_fatal() {
    let _ = PlatformDevice::new(
        "inverted",
        &[Resource::new(0x2000, 0x1000, ResourceFlags::MEM)],
    );
}
