//! Growable array over arena storage.

use crate::arena::{ArenaCell, PageSource, SystemPages};
use crate::error::{Result, StrataError};
use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

const NAME: &str = "ArenaArray";

/// Capacity after growing from `capacity`: 0, 1, 2, 4, 8, ...
fn next_capacity(capacity: usize) -> usize {
    if capacity == 0 { 1 } else { capacity * 2 }
}

/// A growable array whose storage lives in an arena.
///
/// Growing allocates a fresh buffer and moves the elements across; the old
/// buffer stays in the arena until it is rolled back or reset. Element
/// destructors run on [`clear`](Self::clear), [`reset`](Self::reset) and
/// drop.
///
/// An array created with [`new`](Self::new) is not bound to any arena and
/// refuses to grow until [`init`](Self::init) binds it.
pub struct ArenaArray<'a, T, S: PageSource = SystemPages> {
    arena: Option<&'a ArenaCell<S>>,
    items: NonNull<T>,
    len: usize,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<'a, T, S: PageSource> ArenaArray<'a, T, S> {
    /// Create an array bound to no arena.
    pub const fn new() -> Self {
        Self {
            arena: None,
            items: NonNull::dangling(),
            len: 0,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Create an empty array bound to `arena`. Nothing is allocated yet.
    pub fn new_in(arena: &'a ArenaCell<S>) -> Self {
        Self {
            arena: Some(arena),
            items: NonNull::dangling(),
            len: 0,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Create an array bound to `arena` with room for exactly `capacity` items.
    pub fn with_capacity_in(arena: &'a ArenaCell<S>, capacity: usize) -> Result<Self> {
        let mut array = Self::new_in(arena);
        array.reserve_exact(capacity)?;
        Ok(array)
    }

    /// Bind to `arena`, dropping any current contents.
    pub fn init(&mut self, arena: &'a ArenaCell<S>) {
        self.reset();
        self.arena = Some(arena);
    }

    /// Check if the array is bound to an arena.
    pub fn is_initialized(&self) -> bool {
        self.arena.is_some()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if there are no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Items the current buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an item, growing the buffer when full.
    pub fn push(&mut self, item: T) -> Result<()> {
        if self.len == self.capacity {
            self.grow_to(next_capacity(self.capacity))?;
        }
        // SAFETY: len < capacity after growing.
        unsafe { self.items.as_ptr().add(self.len).write(item) };
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last item.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at `len` was initialised and is now outside the array.
        Some(unsafe { self.items.as_ptr().add(self.len).read() })
    }

    /// Drop every item. The buffer is kept.
    pub fn clear(&mut self) {
        let items = self.as_mut_slice() as *mut [T];
        self.len = 0;
        // SAFETY: the items were initialised and are no longer reachable.
        unsafe { ptr::drop_in_place(items) };
    }

    /// Drop every item and forget the buffer, keeping the arena binding.
    pub fn reset(&mut self) {
        self.clear();
        self.items = NonNull::dangling();
        self.capacity = 0;
    }

    /// Make room for exactly `additional` more items.
    pub fn reserve_exact(&mut self, additional: usize) -> Result<()> {
        let needed = self.required(additional)?;
        if needed > self.capacity {
            self.grow_to(needed)?;
        }
        Ok(())
    }

    /// Make room for at least `additional` more items.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.required(additional)?;
        if needed > self.capacity {
            self.grow_to(needed.max(next_capacity(self.capacity)))?;
        }
        Ok(())
    }

    /// View the items.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialised, and the buffer lives
        // as long as the arena borrow.
        unsafe { std::slice::from_raw_parts(self.items.as_ptr(), self.len) }
    }

    /// View the items mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` makes the view unique.
        unsafe { std::slice::from_raw_parts_mut(self.items.as_ptr(), self.len) }
    }

    fn required(&self, additional: usize) -> Result<usize> {
        self.len
            .checked_add(additional)
            .ok_or_else(|| StrataError::AllocationFailure {
                requested: usize::MAX,
                cause: format!("{NAME} length overflow"),
            })
    }

    fn grow_to(&mut self, capacity: usize) -> Result<()> {
        let arena = self
            .arena
            .ok_or(StrataError::UninitializedCollection { collection: NAME })?;

        let layout = Layout::array::<T>(capacity).map_err(|e| StrataError::AllocationFailure {
            requested: capacity,
            cause: format!("{NAME} layout: {e}"),
        })?;
        let items = arena.allocate_layout(layout)?.cast::<T>();

        // SAFETY: the new buffer is fresh arena memory for `capacity >= len`
        // items; the old one holds `len` initialised items that are moved out.
        unsafe { ptr::copy_nonoverlapping(self.items.as_ptr(), items.as_ptr(), self.len) };

        tracing::trace!(from = self.capacity, to = capacity, "grew arena array");
        self.items = items;
        self.capacity = capacity;
        Ok(())
    }
}

impl<'a, T: Copy, S: PageSource> ArenaArray<'a, T, S> {
    /// Append a copy of every item in `items`.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<()> {
        self.reserve(items.len())?;
        // SAFETY: there is room for `items.len()` more items, and arena memory
        // never overlaps a caller's slice.
        unsafe {
            ptr::copy_nonoverlapping(
                items.as_ptr(),
                self.items.as_ptr().add(self.len),
                items.len(),
            )
        };
        self.len += items.len();
        Ok(())
    }

    /// Replace the contents with a copy of `other`.
    ///
    /// The buffer is only replaced when it is too small.
    pub fn copy_from(&mut self, other: &[T]) -> Result<()> {
        self.clear();
        self.extend_from_slice(other)
    }
}

impl<T, S: PageSource> Default for ArenaArray<'_, T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: PageSource> Drop for ArenaArray<'_, T, S> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, S: PageSource> Deref for ArenaArray<'_, T, S> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, S: PageSource> DerefMut for ArenaArray<'_, T, S> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, S: PageSource> fmt::Debug for ArenaArray<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, S: PageSource> PartialEq<[T]> for ArenaArray<'_, T, S> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<'b, T, S: PageSource> IntoIterator for &'b ArenaArray<'_, T, S> {
    type Item = &'b T;
    type IntoIter = std::slice::Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
