//! A single link of the arena chain.

use super::header::{NODE_HEADER_SIZE, NodeHeader};
use super::pages::{PageBlock, PageSource};
use crate::error::{Result, StrataError};
use crate::types::NodeId;
use std::fmt;
use std::ptr::{self, NonNull};

/// Fixed-capacity region carved from one page block.
///
/// The block starts with a [`NodeHeader`]; everything after it is the data
/// area handed out by bump allocation. `current_offset` counts the bytes
/// already handed out from `data_start`.
pub struct ArenaNode {
    block: PageBlock,
    data_start: NonNull<u8>,
    current_offset: usize,
    capacity: usize,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

// SAFETY: the node exclusively owns its block; `data_start` points into it.
unsafe impl Send for ArenaNode {}

impl ArenaNode {
    /// Create a node offering at least `requested_usable` bytes.
    ///
    /// The block is acquired from `source` and stamped with a header carrying
    /// `id` as its sequence number. The node starts empty and unlinked after
    /// `previous`; the chain sets `next` on its predecessor.
    pub fn create<S: PageSource + ?Sized>(
        source: &mut S,
        requested_usable: usize,
        id: NodeId,
        previous: Option<NodeId>,
    ) -> Result<Self> {
        let block = source.acquire(requested_usable)?;

        let Some(capacity) = block.len().checked_sub(NODE_HEADER_SIZE) else {
            let len = block.len();
            source.release(block);
            return Err(StrataError::AllocationFailure {
                requested: requested_usable,
                cause: format!("page source returned a {len}-byte block, smaller than a header"),
            });
        };
        if capacity < requested_usable {
            source.release(block);
            return Err(StrataError::AllocationFailure {
                requested: requested_usable,
                cause: format!("page source returned only {capacity} usable bytes"),
            });
        }

        let header = NodeHeader::new(id.index() as u64, block.len() as u64);
        let mut bytes = [0u8; NODE_HEADER_SIZE];
        if let Err(e) = header.write_to(&mut bytes) {
            source.release(block);
            return Err(StrataError::AllocationFailure {
                requested: requested_usable,
                cause: format!("failed to encode node header: {e}"),
            });
        }

        // SAFETY: the block is at least NODE_HEADER_SIZE bytes long and owned
        // exclusively by this node; the header range is never handed out.
        let data_start = unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), block.as_ptr().as_ptr(), NODE_HEADER_SIZE);
            NonNull::new_unchecked(block.as_ptr().as_ptr().add(NODE_HEADER_SIZE))
        };

        Ok(Self {
            block,
            data_start,
            current_offset: 0,
            capacity,
            previous,
            next: None,
        })
    }

    /// First byte available for allocation.
    pub fn data_start(&self) -> NonNull<u8> {
        self.data_start
    }

    /// Bytes handed out so far.
    pub fn current_offset(&self) -> usize {
        self.current_offset
    }

    /// Usable bytes, fixed at creation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available before alignment padding.
    pub fn remaining(&self) -> usize {
        self.capacity - self.current_offset
    }

    /// Total length of the underlying block, header included.
    pub fn block_len(&self) -> usize {
        self.block.len()
    }

    /// Node linked before this one.
    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    /// Node linked after this one.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Check if nothing has been handed out.
    pub fn is_empty(&self) -> bool {
        self.current_offset == 0
    }

    /// Check if the data area is exhausted.
    pub fn is_full(&self) -> bool {
        self.current_offset == self.capacity
    }

    /// Address the next allocation would start at, before alignment.
    pub fn write_addr(&self) -> usize {
        self.data_start_addr() + self.current_offset
    }

    /// Check if `addr` lies in `[data_start, data_start + capacity]`.
    ///
    /// The end is inclusive so a marker taken on a full node still matches.
    pub fn contains_addr(&self, addr: usize) -> bool {
        let start = self.data_start_addr();
        addr >= start && addr - start <= self.capacity
    }

    /// Read the header back from the block.
    pub fn header(&self) -> std::io::Result<NodeHeader> {
        // SAFETY: the header bytes were initialised in `create` and are
        // never handed out to callers.
        let bytes =
            unsafe { std::slice::from_raw_parts(self.block.as_ptr().as_ptr(), NODE_HEADER_SIZE) };
        NodeHeader::from_bytes(bytes)
    }

    /// Offset at which `size` bytes aligned to `align` would start, if they fit.
    ///
    /// Pure: nothing changes until [`commit`](Self::commit).
    pub(crate) fn fit(&self, size: usize, align: usize) -> Option<usize> {
        debug_assert!(align.is_power_of_two());
        let base = self.data_start_addr();
        let current = base.checked_add(self.current_offset)?;
        let aligned = current.checked_add(align - 1)? & !(align - 1);
        let start = aligned - base;
        let end = start.checked_add(size)?;
        (end <= self.capacity).then_some(start)
    }

    /// Hand out `size` bytes at `start`, as computed by [`fit`](Self::fit).
    pub(crate) fn commit(&mut self, start: usize, size: usize) -> NonNull<u8> {
        debug_assert!(start + size <= self.capacity);
        self.current_offset = start + size;
        // SAFETY: start <= capacity, so the pointer stays within the block.
        unsafe { NonNull::new_unchecked(self.data_start.as_ptr().add(start)) }
    }

    pub(crate) fn set_offset(&mut self, offset: usize) {
        debug_assert!(offset <= self.capacity);
        self.current_offset = offset;
    }

    pub(crate) fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }

    pub(crate) fn unlink(&mut self) {
        self.previous = None;
        self.next = None;
    }

    pub(crate) fn into_block(self) -> PageBlock {
        self.block
    }

    fn data_start_addr(&self) -> usize {
        self.data_start.as_ptr() as usize
    }
}

impl fmt::Debug for ArenaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaNode")
            .field("data_start", &format_args!("0x{:x}", self.data_start_addr()))
            .field("current_offset", &self.current_offset)
            .field("capacity", &self.capacity)
            .field("previous", &self.previous)
            .field("next", &self.next)
            .finish()
    }
}
