//! The arena chain: allocation, deallocation, and checkpoint engines.

use super::config::ArenaConfig;
use super::node::ArenaNode;
use super::pages::{PageSource, SystemPages, block_len_for};
use super::stats::ArenaStats;
use crate::error::{Result, StrataError};
use crate::types::{Checkpoint, NodeId};
use std::alloc::Layout;
use std::fmt;
use std::ptr::{self, NonNull};

/// Largest alignment derived from an allocation size (`max_align_t`).
pub const MAX_ALIGN: usize = 16;

/// Alignment used by [`Arena::allocate`] for a request of `size` bytes.
///
/// `min(size, MAX_ALIGN)` rounded up to a power of two; zero-size requests
/// use alignment 1.
pub fn default_alignment(size: usize) -> usize {
    if size == 0 {
        1
    } else {
        size.min(MAX_ALIGN).next_power_of_two()
    }
}

/// A chain of bump-allocated nodes.
///
/// The arena owns every node and a cursor naming the node allocation starts
/// from. Nodes are only ever appended, so node `n` links to `n - 1` and
/// `n + 1`. Memory is handed out as raw pointers that stay valid until the
/// bytes are released by [`free_tail`](Self::free_tail),
/// [`reset_all`](Self::reset_all), [`restore`](Self::restore) or
/// [`destroy`](Self::destroy); every one of those needs `&mut self`.
///
/// After `destroy` the arena is absent: a second `destroy` is a no-op and
/// everything else fails with `InvalidHandle`.
pub struct Arena<S: PageSource = SystemPages> {
    source: S,
    nodes: Vec<ArenaNode>,
    cursor: usize,
    max_bytes: Option<u64>,
    block_bytes: u64,
}

impl Arena<SystemPages> {
    /// Create an arena over anonymous mappings with the platform page size.
    pub fn new() -> Result<Self> {
        Self::with_config(&ArenaConfig::default())
    }

    /// Create an arena from configuration.
    pub fn with_config(config: &ArenaConfig) -> Result<Self> {
        config.validate()?;
        let source = SystemPages::from_config(config)?;
        Self::with_source_and_budget(source, config.max_bytes)
    }
}

impl<S: PageSource> Arena<S> {
    /// Create an arena drawing blocks from `source`.
    pub fn with_source(source: S) -> Result<Self> {
        Self::with_source_and_budget(source, None)
    }

    /// Create an arena drawing at most `max_bytes` of blocks from `source`.
    ///
    /// The head node (one page) is created immediately.
    pub fn with_source_and_budget(source: S, max_bytes: Option<u64>) -> Result<Self> {
        let mut arena = Self {
            source,
            nodes: Vec::new(),
            cursor: 0,
            max_bytes,
            block_bytes: 0,
        };
        arena.grow(0)?;

        tracing::debug!(
            page_size = arena.source.page_size(),
            capacity = arena.nodes[0].capacity(),
            max_bytes = ?max_bytes,
            "created arena"
        );

        Ok(arena)
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate `size` bytes aligned to [`default_alignment`]`(size)`.
    ///
    /// Tries the cursor node, then each node after it, then links one new
    /// node sized for the request. On failure the cursor and every offset are
    /// unchanged. A zero-size request returns the current position without
    /// consuming anything.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>> {
        self.allocate_aligned(size, default_alignment(size))
    }

    /// Allocate `size` bytes and zero them.
    pub fn allocate_zeroed(&mut self, size: usize) -> Result<NonNull<u8>> {
        let ptr = self.allocate(size)?;
        // SAFETY: `ptr` is valid for `size` freshly handed out bytes.
        unsafe { ptr::write_bytes(ptr.as_ptr(), 0, size) };
        Ok(ptr)
    }

    /// Allocate memory fitting `layout`.
    pub fn allocate_layout(&mut self, layout: Layout) -> Result<NonNull<u8>> {
        self.allocate_aligned(layout.size(), layout.align())
    }

    /// Allocate `size` bytes aligned to `align`.
    ///
    /// `align` must be a power of two no larger than the page size.
    pub fn allocate_aligned(&mut self, size: usize, align: usize) -> Result<NonNull<u8>> {
        self.live("allocate")?;

        let page_size = self.source.page_size();
        if !align.is_power_of_two() || align > page_size {
            return Err(StrataError::InvalidAlignment {
                align,
                max: page_size,
            });
        }

        let mut index = self.cursor;
        loop {
            if let Some(start) = self.nodes[index].fit(size, align) {
                return Ok(self.commit(index, start, size));
            }
            match self.nodes[index].next() {
                Some(next) => index = next.index(),
                None => break,
            }
        }

        // Data starts are only header-aligned, so over-aligned requests need
        // room to pad inside a fresh node.
        let request = if align > MAX_ALIGN {
            size.checked_add(align - 1)
        } else {
            Some(size)
        }
        .ok_or_else(|| StrataError::AllocationFailure {
            requested: size,
            cause: "request overflows the address space".to_string(),
        })?;

        let index = self.grow(request)?;
        let start =
            self.nodes[index]
                .fit(size, align)
                .ok_or_else(|| StrataError::AllocationFailure {
                    requested: size,
                    cause: "new node cannot hold the request".to_string(),
                })?;
        Ok(self.commit(index, start, size))
    }

    fn commit(&mut self, index: usize, start: usize, size: usize) -> NonNull<u8> {
        if index != self.cursor {
            tracing::trace!(from = self.cursor, to = index, "cursor advanced");
        }
        self.cursor = index;
        self.nodes[index].commit(start, size)
    }

    /// Link a new node after the tail and return its index.
    fn grow(&mut self, min_usable: usize) -> Result<usize> {
        let block_len = block_len_for(self.source.page_size(), min_usable)?;

        if let Some(limit) = self.max_bytes {
            let wanted = self.block_bytes.saturating_add(block_len as u64);
            if wanted > limit {
                tracing::warn!(
                    requested = min_usable,
                    block_len,
                    held = self.block_bytes,
                    limit,
                    "arena budget exhausted"
                );
                return Err(StrataError::AllocationFailure {
                    requested: min_usable,
                    cause: format!(
                        "budget of {limit} bytes exhausted ({} held, {block_len} more needed)",
                        self.block_bytes
                    ),
                });
            }
        }

        let id = NodeId::new(self.nodes.len());
        let node = ArenaNode::create(&mut self.source, min_usable, id, id.previous())
            .inspect_err(|e| {
                tracing::warn!(node = %id, requested = min_usable, error = %e, "node creation failed");
            })?;

        if let Some(tail) = self.nodes.last_mut() {
            tail.set_next(Some(id));
        }
        self.block_bytes += node.block_len() as u64;

        tracing::debug!(
            node = %id,
            requested = min_usable,
            capacity = node.capacity(),
            "linked new node"
        );

        self.nodes.push(node);
        Ok(id.index())
    }

    // =========================================================================
    // Deallocation
    // =========================================================================

    /// Release the last `size` bytes handed out.
    ///
    /// Bytes are taken from the cursor node first, then from the nodes before
    /// it; every node emptied on the way is left at offset 0 and the cursor
    /// ends on the node holding the new end. Freeing everything up to the
    /// cursor empties the chain and returns the cursor to the head, even when
    /// the leading nodes were already empty. Fails without changing anything
    /// if `size` exceeds what the chain holds up to the cursor, or if a node
    /// after the cursor still holds data.
    pub fn free_tail(&mut self, size: usize) -> Result<()> {
        self.live("free_tail")?;

        if let Some(busy) = self.nodes[self.cursor + 1..]
            .iter()
            .position(|node| !node.is_empty())
        {
            return Err(StrataError::CursorNotAtTail {
                cursor: NodeId::new(self.cursor),
                busy: NodeId::new(self.cursor + 1 + busy),
            });
        }

        let available: usize = self.nodes[..=self.cursor]
            .iter()
            .map(ArenaNode::current_offset)
            .sum();
        if size > available {
            tracing::warn!(requested = size, available, "free_tail exceeds allocation");
            return Err(StrataError::InsufficientAllocation {
                requested: size,
                available,
            });
        }

        if size == available {
            for node in &mut self.nodes[..=self.cursor] {
                node.set_offset(0);
            }
            tracing::trace!(freed = size, "freed whole chain");
            self.cursor = 0;
            return Ok(());
        }

        let mut remaining = size;
        let mut index = self.cursor;
        loop {
            let node = &mut self.nodes[index];
            let offset = node.current_offset();
            if remaining <= offset {
                node.set_offset(offset - remaining);
                break;
            }
            remaining -= offset;
            node.set_offset(0);
            match node.previous() {
                Some(previous) => index = previous.index(),
                None => break,
            }
        }

        tracing::trace!(freed = size, cursor = index, "freed tail");
        self.cursor = index;
        Ok(())
    }

    /// Empty every node and move the cursor to the head. Blocks are kept.
    pub fn reset_all(&mut self) -> Result<()> {
        self.live("reset")?;

        for node in self.nodes.iter_mut().rev() {
            node.set_offset(0);
        }
        self.cursor = 0;

        tracing::debug!(nodes = self.nodes.len(), "reset arena");
        Ok(())
    }

    /// Release every block and leave the arena absent.
    ///
    /// Nodes after the cursor go first (newest to oldest), then the nodes
    /// before the cursor starting from the head, then the cursor node.
    /// Destroying an absent arena does nothing.
    pub fn destroy(&mut self) {
        if self.nodes.is_empty() {
            return;
        }

        let count = self.nodes.len();
        let mut nodes = std::mem::take(&mut self.nodes);
        let after = nodes.split_off(self.cursor + 1);
        let current = nodes.pop();

        for node in after.into_iter().rev().chain(nodes).chain(current) {
            self.release(node);
        }

        self.cursor = 0;
        self.block_bytes = 0;
        tracing::debug!(nodes = count, "destroyed arena");
    }

    fn release(&mut self, mut node: ArenaNode) {
        node.unlink();
        tracing::trace!(capacity = node.capacity(), "releasing node");
        self.source.release(node.into_block());
    }

    /// Check if [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Checkpoints
    // =========================================================================

    /// Marker for the current write position.
    pub fn checkpoint(&self) -> Result<Checkpoint> {
        self.live("checkpoint")?;
        Ok(Checkpoint::from_addr(self.nodes[self.cursor].write_addr()))
    }

    /// Marker for the write position of a specific node.
    pub fn checkpoint_at(&self, node: NodeId) -> Result<Checkpoint> {
        Ok(Checkpoint::from_addr(self.node(node)?.write_addr()))
    }

    /// Roll back to `checkpoint`.
    ///
    /// Walks back from the cursor to the node whose data range contains the
    /// marker. Every node passed on the way is emptied, the found node's
    /// offset becomes the marker's position, and the cursor moves there. A
    /// marker no node at or behind the cursor contains is rejected without
    /// changing anything.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<()> {
        self.live("restore")?;

        let addr = checkpoint.addr();
        let mut index = self.cursor;
        while !self.nodes[index].contains_addr(addr) {
            match self.nodes[index].previous() {
                Some(previous) => index = previous.index(),
                None => {
                    tracing::warn!(%checkpoint, cursor = self.cursor, "checkpoint not found");
                    return Err(StrataError::InvalidCheckpoint { checkpoint });
                }
            }
        }

        for node in &mut self.nodes[index + 1..=self.cursor] {
            node.set_offset(0);
        }
        let node = &mut self.nodes[index];
        let offset = addr - node.data_start().as_ptr() as usize;
        node.set_offset(offset);

        tracing::trace!(%checkpoint, node = index, offset, rolled_back = self.cursor - index, "restored checkpoint");
        self.cursor = index;
        Ok(())
    }

    /// Run `f` and roll back everything it allocated.
    ///
    /// The rollback happens whatever `f` returns; the arena must still be
    /// live afterwards.
    pub fn scratch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R> {
        let checkpoint = self.checkpoint()?;
        let out = f(self);
        self.restore(checkpoint)?;
        Ok(out)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Page size of the source.
    pub fn page_size(&self) -> usize {
        self.source.page_size()
    }

    /// The page source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Byte budget, if any.
    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    /// Number of nodes in the chain.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node allocation starts from; `None` once destroyed.
    pub fn cursor(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then(|| NodeId::new(self.cursor))
    }

    /// The cursor node.
    pub fn current_node(&self) -> Option<&ArenaNode> {
        self.nodes.get(self.cursor)
    }

    /// Move the cursor to `node`.
    ///
    /// Allocation resumes from that node's offset; `free_tail` refuses to
    /// run while a later node still holds data.
    pub fn seek(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        self.cursor = node.index();
        Ok(())
    }

    /// Look up a node.
    pub fn node(&self, node: NodeId) -> Result<&ArenaNode> {
        self.live("inspect")?;
        self.nodes.get(node.index()).ok_or(StrataError::UnknownNode {
            node,
            len: self.nodes.len(),
        })
    }

    /// Iterate over the chain from head to tail.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = (NodeId, &ArenaNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::new(index), node))
    }

    /// First node of the chain.
    pub fn head(&self) -> Option<&ArenaNode> {
        self.nodes.first()
    }

    /// Last node of the chain.
    pub fn tail(&self) -> Option<&ArenaNode> {
        self.nodes.last()
    }

    /// Snapshot of the chain's usage.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            node_count: self.nodes.len(),
            cursor: self.cursor,
            bytes_in_use: self.nodes.iter().map(ArenaNode::current_offset).sum(),
            usable_capacity: self.nodes.iter().map(ArenaNode::capacity).sum(),
            block_bytes: self.block_bytes,
            page_size: self.source.page_size(),
            max_bytes: self.max_bytes,
        }
    }

    /// Re-read every node header and check the chain invariants.
    pub fn verify(&self) -> Result<()> {
        self.live("verify")?;

        let len = self.nodes.len();
        if self.cursor >= len {
            return Err(StrataError::CorruptNode {
                node: NodeId::new(self.cursor),
                cause: format!("cursor outside a chain of {len} nodes"),
            });
        }

        for (id, node) in self.nodes() {
            let corrupt = |cause: String| StrataError::CorruptNode { node: id, cause };

            let header = node.header().map_err(|e| corrupt(e.to_string()))?;
            header.validate().map_err(|e| corrupt(e.to_string()))?;
            if header.sequence != id.index() as u64 {
                return Err(corrupt(format!(
                    "header sequence {} at chain position {}",
                    header.sequence,
                    id.index()
                )));
            }
            if header.capacity != node.capacity() as u64
                || header.block_len != node.block_len() as u64
            {
                return Err(corrupt("header geometry does not match the block".to_string()));
            }
            if node.current_offset() > node.capacity() {
                return Err(corrupt(format!(
                    "offset {} exceeds capacity {}",
                    node.current_offset(),
                    node.capacity()
                )));
            }

            let expected_next = (id.index() + 1 < len).then(|| id.following());
            if node.previous() != id.previous() || node.next() != expected_next {
                return Err(corrupt("links do not match chain order".to_string()));
            }
        }

        let mut ranges: Vec<(usize, usize, NodeId)> = self
            .nodes()
            .map(|(id, node)| {
                let start = node.data_start().as_ptr() as usize;
                (start, start + node.capacity(), id)
            })
            .collect();
        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            if pair[0].1 > pair[1].0 {
                return Err(StrataError::CorruptNode {
                    node: pair[1].2,
                    cause: format!("data range overlaps {}", pair[0].2),
                });
            }
        }

        Ok(())
    }

    fn live(&self, operation: &'static str) -> Result<()> {
        if self.nodes.is_empty() {
            Err(StrataError::InvalidHandle { operation })
        } else {
            Ok(())
        }
    }
}

impl<S: PageSource> Drop for Arena<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<S: PageSource> fmt::Debug for Arena<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("nodes", &self.nodes)
            .field("cursor", &self.cursor)
            .field("page_size", &self.source.page_size())
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::header::NODE_HEADER_SIZE;
    use crate::arena::pages::HeapPages;

    const PAGE: usize = 4096;
    const CAPACITY: usize = PAGE - NODE_HEADER_SIZE;

    fn arena() -> Arena<HeapPages> {
        Arena::with_source(HeapPages::with_page_size(PAGE).unwrap()).unwrap()
    }

    fn offsets<S: PageSource>(arena: &Arena<S>) -> Vec<usize> {
        arena.nodes().map(|(_, node)| node.current_offset()).collect()
    }

    #[test]
    fn default_alignment_rule() {
        assert_eq!(default_alignment(0), 1);
        assert_eq!(default_alignment(1), 1);
        assert_eq!(default_alignment(3), 4);
        assert_eq!(default_alignment(5), 8);
        assert_eq!(default_alignment(16), 16);
        assert_eq!(default_alignment(4000), MAX_ALIGN);
    }

    #[test]
    fn new_arena_has_one_empty_page() {
        let arena = arena();
        assert_eq!(arena.node_count(), 1);
        assert_eq!(arena.cursor(), Some(NodeId::HEAD));
        let head = arena.head().unwrap();
        assert_eq!(head.capacity(), CAPACITY);
        assert_eq!(head.current_offset(), 0);
        assert!(arena.verify().is_ok());
    }

    #[test]
    fn allocations_are_aligned_and_contiguous() {
        let mut arena = arena();
        let a = arena.allocate(3).unwrap().as_ptr() as usize;
        let b = arena.allocate(8).unwrap().as_ptr() as usize;
        assert_eq!(b % 8, 0);
        assert_eq!(b - a, 8);
        assert_eq!(offsets(&arena), vec![16]);
    }

    #[test]
    fn zero_size_does_not_advance() {
        let mut arena = arena();
        arena.allocate(5).unwrap();
        let before = arena.checkpoint().unwrap();
        let ptr = arena.allocate(0).unwrap();
        assert_eq!(ptr.as_ptr() as usize, before.addr());
        assert_eq!(offsets(&arena), vec![5]);
    }

    #[test]
    fn explicit_alignment() {
        let mut arena = arena();
        arena.allocate(1).unwrap();
        let ptr = arena.allocate_aligned(10, 256).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 256, 0);

        let ptr = arena.allocate_layout(Layout::new::<u64>()).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 8, 0);

        let err = arena.allocate_aligned(8, 3).unwrap_err();
        assert_eq!(err.code(), "E005");
        assert!(arena.allocate_aligned(8, PAGE * 2).is_err());
    }

    #[test]
    fn over_aligned_request_in_new_node() {
        let mut arena = arena();
        arena.allocate(CAPACITY).unwrap();
        let ptr = arena.allocate_aligned(CAPACITY, 1024).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 1024, 0);
        assert_eq!(arena.node_count(), 2);
    }

    #[test]
    fn zeroed_allocation() {
        let mut arena = arena();
        let dirty = arena.allocate(64).unwrap();
        unsafe { ptr::write_bytes(dirty.as_ptr(), 0xAB, 64) };
        arena.reset_all().unwrap();

        let clean = arena.allocate_zeroed(64).unwrap();
        assert_eq!(clean, dirty);
        let bytes = unsafe { std::slice::from_raw_parts(clean.as_ptr(), 64) };
        assert!(bytes.iter().all(|b| *b == 0));
    }

    #[test]
    fn free_tail_within_node() {
        let mut arena = arena();
        arena.allocate(100).unwrap();
        arena.free_tail(40).unwrap();
        assert_eq!(offsets(&arena), vec![60]);
        arena.free_tail(60).unwrap();
        assert_eq!(offsets(&arena), vec![0]);
        assert_eq!(arena.cursor(), Some(NodeId::HEAD));
    }

    #[test]
    fn free_tail_everything_past_empty_head() {
        let mut arena = arena();
        arena.allocate(5000).unwrap();
        assert_eq!(arena.cursor(), Some(NodeId::new(1)));
        assert_eq!(offsets(&arena), vec![0, 5000]);

        arena.free_tail(5000).unwrap();
        assert_eq!(arena.cursor(), Some(NodeId::HEAD));
        assert_eq!(offsets(&arena), vec![0, 0]);
    }

    #[test]
    fn free_tail_insufficient_changes_nothing() {
        let mut arena = arena();
        arena.allocate(100).unwrap();
        let err = arena.free_tail(101).unwrap_err();
        assert_eq!(
            err,
            StrataError::InsufficientAllocation {
                requested: 101,
                available: 100
            }
        );
        assert_eq!(offsets(&arena), vec![100]);
    }

    #[test]
    fn free_tail_requires_cursor_at_tail() {
        let mut arena = arena();
        arena.allocate(3000).unwrap();
        arena.allocate(3000).unwrap();
        arena.seek(NodeId::HEAD).unwrap();

        let err = arena.free_tail(10).unwrap_err();
        assert_eq!(err.code(), "E008");
        assert_eq!(offsets(&arena), vec![3000, 3000]);
    }

    #[test]
    fn restore_within_node() {
        let mut arena = arena();
        arena.allocate(20).unwrap();
        let mark = arena.checkpoint().unwrap();
        arena.allocate(100).unwrap();
        arena.restore(mark).unwrap();
        assert_eq!(offsets(&arena), vec![20]);
    }

    #[test]
    fn restore_unknown_marker() {
        let mut arena = arena();
        arena.allocate(20).unwrap();
        let head_start = arena.head().unwrap().data_start().as_ptr() as usize;

        let err = arena
            .restore(Checkpoint::from_addr(head_start - 1))
            .unwrap_err();
        assert_eq!(err.code(), "E003");
        assert_eq!(offsets(&arena), vec![20]);
    }

    #[test]
    fn scratch_rolls_back() {
        let mut arena = arena();
        arena.allocate(8).unwrap();
        let value = arena
            .scratch(|arena| {
                arena.allocate(5000).unwrap();
                42
            })
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(arena.cursor(), Some(NodeId::HEAD));
        assert_eq!(offsets(&arena), vec![8, 0]);
    }

    #[test]
    fn destroyed_arena_is_absent() {
        let mut arena = arena();
        arena.allocate(10).unwrap();
        arena.destroy();
        assert!(arena.is_destroyed());
        assert_eq!(arena.cursor(), None);
        assert_eq!(arena.node_count(), 0);

        assert_eq!(arena.allocate(1).unwrap_err().code(), "E004");
        assert_eq!(arena.free_tail(1).unwrap_err().code(), "E004");
        assert_eq!(arena.reset_all().unwrap_err().code(), "E004");
        assert_eq!(arena.checkpoint().unwrap_err().code(), "E004");
        assert_eq!(arena.node(NodeId::HEAD).unwrap_err().code(), "E004");
        assert!(arena.verify().is_err());

        arena.destroy();
        assert!(arena.is_destroyed());
    }

    #[test]
    fn seek_and_node_lookup() {
        let mut arena = arena();
        assert_eq!(
            arena.seek(NodeId::new(4)).unwrap_err(),
            StrataError::UnknownNode {
                node: NodeId::new(4),
                len: 1
            }
        );
        assert!(arena.node(NodeId::HEAD).is_ok());
        assert_eq!(arena.checkpoint_at(NodeId::HEAD).unwrap(), arena.checkpoint().unwrap());
    }

    #[test]
    fn stats_track_usage() {
        let mut arena = arena();
        arena.allocate(1000).unwrap();
        arena.allocate(CAPACITY).unwrap();
        let stats = arena.stats();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.cursor, 1);
        assert_eq!(stats.bytes_in_use, 1000 + CAPACITY);
        assert_eq!(stats.usable_capacity, 2 * CAPACITY);
        assert_eq!(stats.block_bytes, 2 * PAGE as u64);
        assert_eq!(stats.page_size, PAGE);
    }
}
