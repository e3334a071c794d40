//! Overwriting ring buffer over arena storage.

use super::array::ArenaArray;
use crate::arena::{ArenaCell, PageSource, SystemPages};
use crate::error::{Result, StrataError};
use std::fmt;

const NAME: &str = "RingBuffer";

/// Fixed-capacity FIFO that overwrites its oldest item when full.
///
/// Slots are allocated once, filled with `T::default()`, and reused. `head`
/// is the physical slot of the oldest item.
pub struct RingBuffer<'a, T, S: PageSource = SystemPages> {
    slots: ArenaArray<'a, T, S>,
    head: usize,
    len: usize,
}

impl<'a, T: Copy + Default, S: PageSource> RingBuffer<'a, T, S> {
    /// Create a ring of `capacity` slots. A ring needs at least two slots.
    pub fn with_capacity(arena: &'a ArenaCell<S>, capacity: usize) -> Result<Self> {
        if capacity <= 1 {
            return Err(StrataError::InvalidArgument {
                collection: NAME,
                cause: format!("capacity must be greater than 1, got {capacity}"),
            });
        }

        let mut slots = ArenaArray::with_capacity_in(arena, capacity)?;
        for _ in 0..capacity {
            slots.push(T::default())?;
        }

        Ok(Self {
            slots,
            head: 0,
            len: 0,
        })
    }

    /// Append an item; when full, the oldest item is overwritten.
    pub fn push(&mut self, item: T) {
        let capacity = self.capacity();
        let slot = (self.head + self.len) % capacity;
        self.slots[slot] = item;
        if self.len == capacity {
            self.head = (self.head + 1) % capacity;
        } else {
            self.len += 1;
        }
    }

    /// Remove and return the oldest item.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = std::mem::take(&mut self.slots[self.head]);
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(item)
    }

    /// Item at logical position `index`, counted from the oldest.
    ///
    /// `Ok(None)` for an empty position; `IndexOutOfBounds` past the capacity.
    pub fn get(&self, index: usize) -> Result<Option<T>> {
        let capacity = self.capacity();
        if index >= capacity {
            return Err(StrataError::IndexOutOfBounds {
                collection: NAME,
                index,
                len: capacity,
            });
        }
        Ok((index < self.len).then(|| self.slots[(self.head + index) % capacity]))
    }

    /// Items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |i| self.slots[(self.head + i) % capacity])
    }

    /// Drop every item, keeping the slots.
    pub fn clear(&mut self) {
        self.slots.fill(T::default());
        self.head = 0;
        self.len = 0;
    }
}

impl<T, S: PageSource> RingBuffer<'_, T, S> {
    /// Physical storage, in slot order.
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if there are no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Check if the next push overwrites.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }
}

impl<T: Copy + Default + fmt::Debug, S: PageSource> fmt::Debug for RingBuffer<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, HeapPages};

    fn cell() -> ArenaCell<HeapPages> {
        ArenaCell::new(Arena::with_source(HeapPages::with_page_size(4096).unwrap()).unwrap())
    }

    #[test]
    fn rejects_tiny_capacity() {
        let arena = cell();
        for capacity in [0, 1] {
            let err = RingBuffer::<u32, _>::with_capacity(&arena, capacity).unwrap_err();
            assert_eq!(err.code(), "E104");
        }
    }

    #[test]
    fn allocates_exact_slots() {
        let arena = cell();
        let ring = RingBuffer::<i32, _>::with_capacity(&arena, 5).unwrap();
        assert_eq!(ring.capacity(), 5);
        assert_eq!(ring.slots(), &[0; 5]);
        assert_eq!(arena.stats().bytes_in_use, 5 * 4);
    }

    #[test]
    fn fifo_order() {
        let arena = cell();
        let mut ring = RingBuffer::with_capacity(&arena, 3).unwrap();
        ring.push(1u8);
        ring.push(2);
        assert_eq!(ring.pop_front(), Some(1));
        ring.push(3);
        ring.push(4);
        assert!(ring.is_full());
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(ring.pop_front(), Some(2));
        assert_eq!(ring.pop_front(), Some(3));
        assert_eq!(ring.pop_front(), Some(4));
        assert_eq!(ring.pop_front(), None);
        assert!(ring.is_empty());
    }

    #[test]
    fn full_ring_eats_its_head() {
        let arena = cell();
        let mut ring = RingBuffer::with_capacity(&arena, 5).unwrap();
        for value in [5, 7, 9, 1, 2, 3] {
            ring.push(value);
        }
        assert_eq!(ring.slots(), &[3, 7, 9, 1, 2]);
        assert_eq!(ring.len(), 5);
        for (index, expected) in [7, 9, 1, 2, 3].into_iter().enumerate() {
            assert_eq!(ring.get(index).unwrap(), Some(expected));
        }
        assert_eq!(ring.get(5).unwrap_err().code(), "E103");
    }

    #[test]
    fn get_past_len() {
        let arena = cell();
        let mut ring = RingBuffer::with_capacity(&arena, 4).unwrap();
        ring.push(10u16);
        assert_eq!(ring.get(0).unwrap(), Some(10));
        assert_eq!(ring.get(1).unwrap(), None);

        ring.clear();
        assert_eq!(ring.get(0).unwrap(), None);
        assert_eq!(ring.slots(), &[0; 4]);
    }
}
