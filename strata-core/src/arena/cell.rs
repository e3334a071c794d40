//! Shared handle for collections allocating from one arena.

use super::chain::Arena;
use super::pages::{PageSource, SystemPages};
use super::stats::ArenaStats;
use crate::error::Result;
use crate::types::Checkpoint;
use std::alloc::Layout;
use std::cell::RefCell;
use std::ptr::NonNull;

/// An arena that several collections can allocate from at once.
///
/// Only operations that hand out fresh memory are reachable through `&self`.
/// Anything that takes memory back (`restore`, `free_tail`, `reset_all`,
/// `destroy`) needs [`get_mut`](Self::get_mut), which the borrow checker
/// grants only after every collection borrowing the cell is gone.
pub struct ArenaCell<S: PageSource = SystemPages> {
    inner: RefCell<Arena<S>>,
}

impl<S: PageSource> ArenaCell<S> {
    /// Wrap an arena.
    pub fn new(arena: Arena<S>) -> Self {
        Self {
            inner: RefCell::new(arena),
        }
    }

    // No borrow of `inner` outlives the method that takes it.

    /// See [`Arena::allocate`].
    pub fn allocate(&self, size: usize) -> Result<NonNull<u8>> {
        self.inner.borrow_mut().allocate(size)
    }

    /// See [`Arena::allocate_zeroed`].
    pub fn allocate_zeroed(&self, size: usize) -> Result<NonNull<u8>> {
        self.inner.borrow_mut().allocate_zeroed(size)
    }

    /// See [`Arena::allocate_aligned`].
    pub fn allocate_aligned(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        self.inner.borrow_mut().allocate_aligned(size, align)
    }

    /// See [`Arena::allocate_layout`].
    pub fn allocate_layout(&self, layout: Layout) -> Result<NonNull<u8>> {
        self.inner.borrow_mut().allocate_layout(layout)
    }

    /// See [`Arena::checkpoint`].
    pub fn checkpoint(&self) -> Result<Checkpoint> {
        self.inner.borrow().checkpoint()
    }

    /// See [`Arena::stats`].
    pub fn stats(&self) -> ArenaStats {
        self.inner.borrow().stats()
    }

    /// Exclusive access to the arena.
    pub fn get_mut(&mut self) -> &mut Arena<S> {
        self.inner.get_mut()
    }

    /// Unwrap the arena.
    pub fn into_inner(self) -> Arena<S> {
        self.inner.into_inner()
    }
}

impl<S: PageSource> From<Arena<S>> for ArenaCell<S> {
    fn from(arena: Arena<S>) -> Self {
        Self::new(arena)
    }
}

impl<S: PageSource> std::fmt::Debug for ArenaCell<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaCell")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::pages::HeapPages;

    #[test]
    fn shared_allocation_then_exclusive_restore() {
        let arena = Arena::with_source(HeapPages::with_page_size(4096).unwrap()).unwrap();
        let mut cell = ArenaCell::new(arena);

        let mark = cell.checkpoint().unwrap();
        let a = cell.allocate(8).unwrap();
        let b = cell.allocate_zeroed(8).unwrap();
        assert_ne!(a, b);
        assert_eq!(cell.stats().bytes_in_use, 16);

        cell.get_mut().restore(mark).unwrap();
        assert_eq!(cell.stats().bytes_in_use, 0);

        let arena = cell.into_inner();
        assert_eq!(arena.node_count(), 1);
    }
}
