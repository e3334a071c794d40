//! Fixed-capacity array on the heap.

use crate::error::{Result, StrataError};
use std::ops::{Deref, DerefMut};

const NAME: &str = "FixedArray";

/// An array that never grows past the capacity it was created with.
///
/// Storage comes from the heap rather than an arena, for collections whose
/// lifetime does not follow any arena's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedArray<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> FixedArray<T> {
    /// Create an empty array with room for exactly `capacity` items.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|e| StrataError::AllocationFailure {
                requested: capacity,
                cause: e.to_string(),
            })?;
        Ok(Self { items, capacity })
    }

    /// Append an item, failing when the array is full.
    pub fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() == self.capacity {
            return Err(StrataError::CapacityExceeded {
                collection: NAME,
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove and return the last item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if no more items fit.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// The fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// View the items.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Deref for FixedArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for FixedArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}
