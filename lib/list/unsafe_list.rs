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

use core::cmp::Ordering;
use core::marker::PhantomData;
use core::ptr::NonNull;

// Intrusive links are hostile territory for Rust's aliasing model: a node
// reachable through the list must never also be reached through a unique
// `&mut` the compiler believes is unaliased.  Two measures keep this sound,
// following the approach Tokio documents for its intrusive structures:
//
// * `LinkInner` carries `PhantomPinned`.  Besides making the containing node
//   unmovable once pinned, this disables the `noalias` annotation on mutable
//   references to the node (rust-lang/rust#82834), so the compiler will not
//   assume exclusive access.
// * The `next`/`prev` words are read and written through raw pointer
//   arithmetic on the `LinkInner` allocation rather than through field
//   references.  `LinkInner` is `#[repr(C)]` so the offsets are fixed, and it
//   lives in a private module so no other code can form references to the
//   fields.
mod inner {
    use core::marker::PhantomPinned;
    use core::mem::offset_of;
    use core::ptr::NonNull;

    use super::Link;

    #[repr(C)]
    pub struct LinkInner {
        #[allow(dead_code)]
        next: Option<NonNull<Link>>,
        #[allow(dead_code)]
        prev: Option<NonNull<Link>>,
        _pin: PhantomPinned,
    }

    impl LinkInner {
        pub const NEXT_OFFSET: usize = offset_of!(LinkInner, next);
        pub const PREV_OFFSET: usize = offset_of!(LinkInner, prev);

        // A distinguished value marking a node that is in no list.  `None` is
        // taken: it terminates a list at the head and tail.
        pub const UNLINKED: Option<NonNull<Link>> =
            Some(NonNull::new(usize::MAX as *mut Link).unwrap());

        pub const fn new() -> Self {
            Self {
                next: Self::UNLINKED,
                prev: Self::UNLINKED,
                _pin: PhantomPinned,
            }
        }
    }
}
use core::cell::UnsafeCell;

use inner::LinkInner;

/// The intrusive hook embedded in every list member.
pub struct Link {
    // The UnsafeCell sanctions mutation through shared references; the list
    // serializes that mutation.
    inner: UnsafeCell<LinkInner>,
}

// SAFETY: A linked node is logically owned by the list holding it, and every
// mutation of its pointer words happens through list operations for which the
// caller guarantees exclusive access.
unsafe impl Send for Link {}
unsafe impl Sync for Link {}

impl Link {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinkInner::new()),
        }
    }

    #[must_use]
    pub fn is_unlinked(&self) -> bool {
        self.next() == LinkInner::UNLINKED && self.prev() == LinkInner::UNLINKED
    }

    #[must_use]
    pub fn is_linked(&self) -> bool {
        !self.is_unlinked()
    }

    #[inline]
    fn word(&self, offset: usize) -> Option<NonNull<Link>> {
        let base = self.inner.get().cast::<Option<NonNull<Link>>>();
        // SAFETY: `offset` is one of the two field offsets of the repr(C)
        // `LinkInner`, and reads of the word go through the `UnsafeCell`.
        unsafe { base.byte_add(offset).read() }
    }

    #[inline]
    fn set_word(&self, offset: usize, value: Option<NonNull<Link>>) {
        let base = self.inner.get().cast::<Option<NonNull<Link>>>();
        // SAFETY: Same bounds argument as `word`; the caller (this module)
        // guarantees no concurrent access.
        unsafe { base.byte_add(offset).write(value) }
    }

    #[inline]
    fn next(&self) -> Option<NonNull<Link>> {
        self.word(LinkInner::NEXT_OFFSET)
    }

    #[inline]
    fn prev(&self) -> Option<NonNull<Link>> {
        self.word(LinkInner::PREV_OFFSET)
    }

    #[inline]
    fn set_next(&self, value: Option<NonNull<Link>>) {
        self.set_word(LinkInner::NEXT_OFFSET, value);
    }

    #[inline]
    fn set_prev(&self, value: Option<NonNull<Link>>) {
        self.set_word(LinkInner::PREV_OFFSET, value);
    }

    fn set_unlinked(&self) {
        self.set_next(LinkInner::UNLINKED);
        self.set_prev(LinkInner::UNLINKED);
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a member type to the offset of its embedded [`Link`].
pub trait Adapter {
    const LINK_OFFSET: usize;
}

/// Defines an adapter type and implements [`Adapter`] for it.
///
/// ```
/// use list::{Link, define_adapter};
///
/// struct Node {
///     value: u32,
///     link: Link,
/// }
/// define_adapter!(pub NodeAdapter => Node::link);
/// ```
#[macro_export]
macro_rules! define_adapter {
    ($vis:vis $name:ident => $node:ident :: $link:ident) => {
        $vis struct $name {}

        impl $crate::Adapter for $name {
            const LINK_OFFSET: usize = core::mem::offset_of!($node, $link);
        }
    };
}

// The untyped core of the list.  Keeping the pointer surgery in concrete
// (non-generic) methods limits monomorphization to the thin typed shims in
// `UnsafeList`.
struct RawList {
    head: Option<NonNull<Link>>,
    tail: Option<NonNull<Link>>,
}

impl RawList {
    const fn new() -> Self {
        Self {
            head: None,
            tail: None,
        }
    }

    const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    unsafe fn push_front(&mut self, link_ptr: NonNull<Link>) {
        let link = unsafe { link_ptr.as_ref() };
        link.set_prev(None);
        link.set_next(self.head);

        match self.head {
            // Empty list; the new node is also the tail.
            None => self.tail = Some(link_ptr),
            Some(head) => unsafe { head.as_ref() }.set_prev(Some(link_ptr)),
        }
        self.head = Some(link_ptr);
    }

    unsafe fn push_back(&mut self, link_ptr: NonNull<Link>) {
        let link = unsafe { link_ptr.as_ref() };
        link.set_next(None);
        link.set_prev(self.tail);

        match self.tail {
            // Empty list; the new node is also the head.
            None => self.head = Some(link_ptr),
            Some(tail) => unsafe { tail.as_ref() }.set_next(Some(link_ptr)),
        }
        self.tail = Some(link_ptr);
    }

    /// Splices `link_ptr` in immediately before `anchor`, which must be
    /// linked.
    unsafe fn insert_before(&mut self, link_ptr: NonNull<Link>, anchor: NonNull<Link>) {
        let link = unsafe { link_ptr.as_ref() };
        let anchor_link = unsafe { anchor.as_ref() };

        let prev = anchor_link.prev();
        link.set_next(Some(anchor));
        link.set_prev(prev);
        anchor_link.set_prev(Some(link_ptr));

        match prev {
            // Anchor was the head.
            None => self.head = Some(link_ptr),
            Some(prev) => unsafe { prev.as_ref() }.set_next(Some(link_ptr)),
        }
    }

    unsafe fn unlink(&mut self, link_ptr: NonNull<Link>) {
        let link = unsafe { link_ptr.as_ref() };
        let prev = link.prev();
        let next = link.next();
        link.set_unlinked();

        match prev {
            None => self.head = next,
            Some(prev) => unsafe { prev.as_ref() }.set_next(next),
        }
        match next {
            None => self.tail = prev,
            Some(next) => unsafe { next.as_ref() }.set_prev(prev),
        }
    }

    unsafe fn pop_head(&mut self) -> Option<NonNull<Link>> {
        let head = self.head?;
        unsafe { self.unlink(head) };
        Some(head)
    }

    unsafe fn for_each(&self, callback: &mut dyn FnMut(NonNull<Link>) -> Result<(), ()>) {
        let mut cursor = self.head;
        while let Some(link_ptr) = cursor {
            cursor = unsafe { link_ptr.as_ref() }.next();
            if callback(link_ptr).is_err() {
                return;
            }
        }
    }

    // The next pointer is captured before the callback runs, so the callback
    // may unlink the visited node.
    unsafe fn filter(&mut self, callback: &mut dyn FnMut(NonNull<Link>) -> bool) {
        let mut cursor = self.head;
        while let Some(link_ptr) = cursor {
            cursor = unsafe { link_ptr.as_ref() }.next();
            if !callback(link_ptr) {
                unsafe { self.unlink(link_ptr) };
            }
        }
    }

    unsafe fn sorted_insert_by(
        &mut self,
        link_ptr: NonNull<Link>,
        compare: &mut dyn FnMut(NonNull<Link>, NonNull<Link>) -> Ordering,
    ) {
        let mut cursor = self.head;
        while let Some(anchor) = cursor {
            if compare(link_ptr, anchor) == Ordering::Less {
                unsafe { self.insert_before(link_ptr, anchor) };
                return;
            }
            cursor = unsafe { anchor.as_ref() }.next();
        }
        unsafe { self.push_back(link_ptr) };
    }
}

/// An intrusive list of `T`s linked through the field `A` names.
///
/// The list stores raw node pointers and cannot enforce that the nodes
/// outlive it or that access is exclusive; every operation is `unsafe` and
/// states its obligations.  Higher layers (the timer queue, for instance)
/// wrap it behind a lock and a narrower API.
pub struct UnsafeList<T, A: Adapter> {
    raw: RawList,
    _phantom_type: PhantomData<T>,
    _phantom_adapter: PhantomData<A>,
}

impl<T, A: Adapter> UnsafeList<T, A> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawList::new(),
            _phantom_type: PhantomData,
            _phantom_adapter: PhantomData,
        }
    }

    /// # Safety
    /// The caller must have exclusive access to the list and its members.
    #[must_use]
    pub unsafe fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn link_of(element: NonNull<T>) -> NonNull<Link> {
        // SAFETY: `A::LINK_OFFSET` is the offset of a `Link` field inside
        // `T`, so the sum stays inside the `T` allocation.
        unsafe { element.cast::<Link>().byte_add(A::LINK_OFFSET) }
    }

    fn element_of(link: NonNull<Link>) -> NonNull<T> {
        // SAFETY: Inverse of `link_of`; `link` was produced from an element
        // of this list's member type.
        unsafe { link.byte_sub(A::LINK_OFFSET).cast::<T>() }
    }

    /// Returns true if `element` is in *any* list using this adapter.
    ///
    /// # Safety
    /// `element` must point to a valid `T`.
    #[must_use]
    pub unsafe fn is_element_linked(&self, element: NonNull<T>) -> bool {
        unsafe { Self::link_of(element).as_ref() }.is_linked()
    }

    /// # Safety
    /// The caller must have exclusive access to the list and its members,
    /// and `element` must be a valid `T` that is in no list.
    pub unsafe fn push_front_unchecked(&mut self, element: NonNull<T>) {
        unsafe { self.raw.push_front(Self::link_of(element)) };
    }

    /// # Safety
    /// The caller must have exclusive access to the list and its members,
    /// and `element` must be a valid `T` that is in no list.
    pub unsafe fn push_back_unchecked(&mut self, element: NonNull<T>) {
        unsafe { self.raw.push_back(Self::link_of(element)) };
    }

    /// Unlinks `element` if it is currently linked, returning whether it was.
    ///
    /// # Safety
    /// The caller must have exclusive access to the list and its members,
    /// and `element` must be a valid `T` that is either unlinked or a member
    /// of *this* list.
    pub unsafe fn unlink_element(&mut self, element: NonNull<T>) -> Option<NonNull<T>> {
        let link_ptr = Self::link_of(element);
        if unsafe { link_ptr.as_ref() }.is_linked() {
            unsafe { self.raw.unlink(link_ptr) };
            Some(element)
        } else {
            None
        }
    }

    /// # Safety
    /// The caller must have exclusive access to the list and its members,
    /// and `element` must be a member of this list.
    pub unsafe fn unlink_element_unchecked(&mut self, element: NonNull<T>) {
        unsafe { self.raw.unlink(Self::link_of(element)) };
    }

    /// Removes and returns the first element, clearing its link state.
    ///
    /// # Safety
    /// The caller must have exclusive access to the list and its members.
    pub unsafe fn pop_head(&mut self) -> Option<NonNull<T>> {
        unsafe { self.raw.pop_head() }.map(Self::element_of)
    }

    /// Visits every element in insertion order until `callback` errs.
    ///
    /// # Safety
    /// The caller must have exclusive access to the list and its members.
    pub unsafe fn for_each<E, F: FnMut(&T) -> Result<(), E>>(
        &self,
        mut callback: F,
    ) -> Result<(), E> {
        let mut result = Ok(());
        unsafe {
            self.raw.for_each(&mut |link_ptr| {
                let element = Self::element_of(link_ptr);
                callback(element.as_ref()).map_err(|e| result = Err(e))
            });
        }
        result
    }

    /// Forward-safe traversal: visits every element and unlinks those for
    /// which `callback` returns false.  The callback may hand the removed
    /// element to another list.
    ///
    /// # Safety
    /// The caller must have exclusive access to the list and its members.
    pub unsafe fn filter<F: FnMut(&mut T) -> bool>(&mut self, mut callback: F) {
        unsafe {
            self.raw.filter(&mut |link_ptr| {
                let mut element = Self::element_of(link_ptr);
                callback(element.as_mut())
            });
        }
    }

    /// Inserts `element` before the first member that compares greater,
    /// keeping a sorted list sorted.
    ///
    /// # Safety
    /// The caller must have exclusive access to the list and its members,
    /// and `element` must be a valid `T` that is in no list.
    pub unsafe fn sorted_insert_by_unchecked<F: FnMut(&T, &T) -> Ordering>(
        &mut self,
        element: NonNull<T>,
        mut compare: F,
    ) {
        let mut compare_links = |lhs: NonNull<Link>, rhs: NonNull<Link>| {
            let lhs = Self::element_of(lhs);
            let rhs = Self::element_of(rhs);
            // SAFETY: Both pointers refer to live members per this method's
            // contract.
            unsafe { compare(lhs.as_ref(), rhs.as_ref()) }
        };
        unsafe {
            self.raw
                .sorted_insert_by(Self::link_of(element), &mut compare_links);
        }
    }
}

impl<T, A: Adapter> Default for UnsafeList<T, A> {
    fn default() -> Self {
        Self::new()
    }
}
