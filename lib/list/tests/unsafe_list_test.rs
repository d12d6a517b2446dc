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

use core::ptr::NonNull;

use list::{Link, UnsafeList, define_adapter};

// `#[repr(C)]` keeps `link` at a non-zero offset so that a broken
// link-to-element upcast cannot hide behind a zero `LINK_OFFSET`.
#[repr(C)]
struct TestMember {
    value: u32,
    link: Link,
}

impl TestMember {
    fn new(value: u32) -> Self {
        Self {
            value,
            link: Link::new(),
        }
    }
}

define_adapter!(TestAdapter => TestMember::link);

type TestList = UnsafeList<TestMember, TestAdapter>;

fn collect(list: &TestList) -> Vec<u32> {
    let mut values = Vec::new();
    unsafe {
        let _ = list.for_each(|element| -> Result<(), ()> {
            values.push(element.value);
            Ok(())
        });
    }
    values
}

#[test]
fn new_link_is_not_linked() {
    let link = Link::new();
    assert!(link.is_unlinked());
    assert!(!link.is_linked());
}

#[test]
fn new_list_is_empty() {
    let list = TestList::new();
    assert!(unsafe { list.is_empty() });
}

#[test]
fn push_front_adds_in_reverse_order() {
    let mut e1 = TestMember::new(1);
    let mut e2 = TestMember::new(2);
    let mut e3 = TestMember::new(3);

    let mut list = TestList::new();
    unsafe {
        list.push_front_unchecked(NonNull::from(&mut e3));
        list.push_front_unchecked(NonNull::from(&mut e2));
        list.push_front_unchecked(NonNull::from(&mut e1));
    }

    assert_eq!(collect(&list), vec![1, 2, 3]);
    assert!(e1.link.is_linked());
    assert!(e2.link.is_linked());
    assert!(e3.link.is_linked());
}

#[test]
fn push_back_preserves_insertion_order() {
    let mut e1 = TestMember::new(1);
    let mut e2 = TestMember::new(2);
    let mut e3 = TestMember::new(3);

    let mut list = TestList::new();
    unsafe {
        list.push_back_unchecked(NonNull::from(&mut e1));
        list.push_back_unchecked(NonNull::from(&mut e2));
        list.push_back_unchecked(NonNull::from(&mut e3));
    }

    assert_eq!(collect(&list), vec![1, 2, 3]);
}

#[test]
fn unlink_middle_element_keeps_neighbors_connected() {
    let mut e1 = TestMember::new(1);
    let mut e2 = TestMember::new(2);
    let mut e3 = TestMember::new(3);

    let mut list = TestList::new();
    unsafe {
        list.push_back_unchecked(NonNull::from(&mut e1));
        list.push_back_unchecked(NonNull::from(&mut e2));
        list.push_back_unchecked(NonNull::from(&mut e3));

        assert!(list.unlink_element(NonNull::from(&mut e2)).is_some());
    }

    assert_eq!(collect(&list), vec![1, 3]);
    assert!(e2.link.is_unlinked());

    // A second unlink reports that the element was not a member.
    unsafe {
        assert!(list.unlink_element(NonNull::from(&mut e2)).is_none());
    }
}

#[test]
fn unlink_head_and_tail_update_endpoints() {
    let mut e1 = TestMember::new(1);
    let mut e2 = TestMember::new(2);
    let mut e3 = TestMember::new(3);

    let mut list = TestList::new();
    unsafe {
        list.push_back_unchecked(NonNull::from(&mut e1));
        list.push_back_unchecked(NonNull::from(&mut e2));
        list.push_back_unchecked(NonNull::from(&mut e3));

        list.unlink_element_unchecked(NonNull::from(&mut e1));
        assert_eq!(collect(&list), vec![2, 3]);

        list.unlink_element_unchecked(NonNull::from(&mut e3));
        assert_eq!(collect(&list), vec![2]);

        list.unlink_element_unchecked(NonNull::from(&mut e2));
        assert!(list.is_empty());
    }
}

#[test]
fn pop_head_returns_elements_in_order_and_clears_links() {
    let mut e1 = TestMember::new(1);
    let mut e2 = TestMember::new(2);

    let mut list = TestList::new();
    unsafe {
        list.push_back_unchecked(NonNull::from(&mut e1));
        list.push_back_unchecked(NonNull::from(&mut e2));

        let first = list.pop_head().unwrap();
        assert_eq!(first.as_ref().value, 1);
        assert!(first.as_ref().link.is_unlinked());

        let second = list.pop_head().unwrap();
        assert_eq!(second.as_ref().value, 2);

        assert!(list.pop_head().is_none());
        assert!(list.is_empty());
    }
}

#[test]
fn filter_supports_removal_during_traversal() {
    let mut elements: Vec<TestMember> = (1..=6).map(TestMember::new).collect();

    let mut list = TestList::new();
    unsafe {
        for element in elements.iter_mut() {
            list.push_back_unchecked(NonNull::from(element));
        }

        // Drop the even values mid-traversal.
        list.filter(|element| element.value % 2 != 0);
    }

    assert_eq!(collect(&list), vec![1, 3, 5]);
    assert!(elements[1].link.is_unlinked());
    assert!(elements[3].link.is_unlinked());
    assert!(elements[5].link.is_unlinked());
}

#[test]
fn is_element_linked_reflects_membership() {
    let mut e1 = TestMember::new(1);

    let mut list = TestList::new();
    unsafe {
        assert!(!list.is_element_linked(NonNull::from(&mut e1)));
        list.push_back_unchecked(NonNull::from(&mut e1));
        assert!(list.is_element_linked(NonNull::from(&mut e1)));
        list.unlink_element_unchecked(NonNull::from(&mut e1));
        assert!(!list.is_element_linked(NonNull::from(&mut e1)));
    }
}

#[test]
fn sorted_insert_keeps_list_ordered() {
    let mut e1 = TestMember::new(10);
    let mut e2 = TestMember::new(30);
    let mut e3 = TestMember::new(20);
    let mut e4 = TestMember::new(5);

    let mut list = TestList::new();
    let by_value = |a: &TestMember, b: &TestMember| a.value.cmp(&b.value);
    unsafe {
        list.sorted_insert_by_unchecked(NonNull::from(&mut e1), by_value);
        list.sorted_insert_by_unchecked(NonNull::from(&mut e2), by_value);
        list.sorted_insert_by_unchecked(NonNull::from(&mut e3), by_value);
        list.sorted_insert_by_unchecked(NonNull::from(&mut e4), by_value);
    }

    assert_eq!(collect(&list), vec![5, 10, 20, 30]);
}

#[test]
fn for_each_stops_on_error() {
    let mut e1 = TestMember::new(1);
    let mut e2 = TestMember::new(2);
    let mut e3 = TestMember::new(3);

    let mut list = TestList::new();
    let mut visited = Vec::new();
    unsafe {
        list.push_back_unchecked(NonNull::from(&mut e1));
        list.push_back_unchecked(NonNull::from(&mut e2));
        list.push_back_unchecked(NonNull::from(&mut e3));

        let result = list.for_each(|element| {
            visited.push(element.value);
            if element.value == 2 { Err("stop") } else { Ok(()) }
        });
        assert_eq!(result, Err("stop"));
    }

    assert_eq!(visited, vec![1, 2]);
}
