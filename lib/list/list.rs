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

//! Intrusive doubly-linked list.
//!
//! Nodes embed a [`Link`] and an [`Adapter`] records the link's offset inside
//! the owning structure, so membership costs no allocation and removal is
//! O(1) given only a node pointer.  All pointer/upcast unsafety is confined
//! to this crate; users interact through raw-pointer APIs whose obligations
//! are spelled out per method.

#![no_std]

pub mod unsafe_list;

pub use unsafe_list::{Adapter, Link, UnsafeList};
