//! Integration tests for the arena chain.
//!
//! These tests drive the arena through a counting page source so node
//! creation and teardown can be checked block by block.

use strata_core::StrataError;
use strata_core::arena::{Arena, ArenaConfig, HeapPages, NODE_HEADER_SIZE, PageBacking};
use strata_core::testing::{CountingPages, PageLedger};
use strata_core::types::NodeId;

const PAGE: usize = 4096;
const CAPACITY: usize = PAGE - NODE_HEADER_SIZE;

fn counting_arena() -> (Arena<CountingPages>, PageLedger) {
    let pages = CountingPages::heap(PAGE).unwrap();
    let ledger = pages.ledger();
    (Arena::with_source(pages).unwrap(), ledger)
}

fn offsets<S: strata_core::arena::PageSource>(arena: &Arena<S>) -> Vec<usize> {
    arena.nodes().map(|(_, node)| node.current_offset()).collect()
}

#[test]
fn test_overflow_creates_second_node() {
    let (mut arena, ledger) = counting_arena();
    assert_eq!(arena.head().unwrap().capacity(), CAPACITY);

    arena.allocate(3000).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::HEAD));

    arena.allocate(3000).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::new(1)));
    assert_eq!(arena.node_count(), 2);
    assert_eq!(ledger.acquired(), 2);

    let head = arena.node(NodeId::HEAD).unwrap();
    assert_eq!(head.current_offset(), 3000);
    assert_eq!(head.next(), Some(NodeId::new(1)));
    let second = arena.node(NodeId::new(1)).unwrap();
    assert_eq!(second.previous(), Some(NodeId::HEAD));
    assert_eq!(second.current_offset(), 3000);

    arena.verify().unwrap();
}

#[test]
fn test_restore_across_nodes() {
    let (mut arena, _ledger) = counting_arena();

    arena.allocate(20).unwrap();
    let mark = arena.checkpoint().unwrap();

    arena.allocate(3000).unwrap();
    arena.allocate(2000).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::new(1)));
    assert!(arena.node(NodeId::new(1)).unwrap().current_offset() > 0);

    arena.restore(mark).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::HEAD));
    assert_eq!(offsets(&arena), vec![20, 0]);
}

#[test]
fn test_destroy_from_middle_node() {
    let (mut arena, ledger) = counting_arena();

    for _ in 0..3 {
        arena.allocate(CAPACITY).unwrap();
    }
    assert_eq!(arena.node_count(), 3);
    arena.seek(NodeId::new(1)).unwrap();

    let addrs: Vec<usize> = arena
        .nodes()
        .map(|(_, node)| node.data_start().as_ptr() as usize - NODE_HEADER_SIZE)
        .collect();

    arena.destroy();
    assert!(arena.is_destroyed());
    assert_eq!(arena.cursor(), None);
    assert_eq!(ledger.released(), 3);
    assert_eq!(ledger.outstanding(), 0);
    assert!(!ledger.has_double_release());

    // After the cursor, then before it, then the cursor node itself.
    assert_eq!(ledger.released_addrs(), vec![addrs[2], addrs[0], addrs[1]]);

    arena.destroy();
    drop(arena);
    assert_eq!(ledger.released(), 3);
}

#[test]
fn test_destroy_releases_earlier_nodes_from_the_head() {
    let (mut arena, ledger) = counting_arena();

    for _ in 0..5 {
        arena.allocate(CAPACITY).unwrap();
    }
    arena.seek(NodeId::new(3)).unwrap();

    let addrs: Vec<usize> = arena
        .nodes()
        .map(|(_, node)| node.data_start().as_ptr() as usize - NODE_HEADER_SIZE)
        .collect();

    arena.destroy();
    assert_eq!(ledger.outstanding(), 0);
    assert_eq!(
        ledger.released_addrs(),
        vec![addrs[4], addrs[0], addrs[1], addrs[2], addrs[3]]
    );
}

#[test]
fn test_drop_releases_every_block() {
    let (mut arena, ledger) = counting_arena();
    arena.allocate(3 * PAGE).unwrap();
    arena.allocate(10).unwrap();
    let acquired = ledger.acquired();
    drop(arena);

    assert_eq!(ledger.released(), acquired);
    assert_eq!(ledger.outstanding(), 0);
    assert!(!ledger.has_double_release());
}

#[test]
fn test_failed_growth_changes_nothing() {
    let (mut arena, ledger) = counting_arena();
    arena.allocate(100).unwrap();
    let before = offsets(&arena);

    ledger.arm_failures(1);
    let err = arena.allocate(CAPACITY).unwrap_err();
    assert_eq!(err.code(), "E001");
    assert_eq!(ledger.refused(), 1);

    assert_eq!(offsets(&arena), before);
    assert_eq!(arena.cursor(), Some(NodeId::HEAD));
    assert_eq!(arena.node_count(), 1);
    arena.verify().unwrap();

    // The next attempt goes through.
    arena.allocate(CAPACITY).unwrap();
    assert_eq!(arena.node_count(), 2);
}

#[test]
fn test_budget_exhaustion() {
    let pages = CountingPages::heap(PAGE).unwrap();
    let ledger = pages.ledger();
    let mut arena = Arena::with_source_and_budget(pages, Some(2 * PAGE as u64)).unwrap();

    arena.allocate(CAPACITY).unwrap();
    arena.allocate(CAPACITY).unwrap();
    let err = arena.allocate(1).unwrap_err();
    assert!(matches!(err, StrataError::AllocationFailure { .. }));
    assert!(err.is_memory_error());
    assert_eq!(ledger.acquired(), 2);

    // Space freed inside the budget is still usable.
    arena.free_tail(64).unwrap();
    arena.allocate(64).unwrap();
    assert_eq!(arena.stats().block_bytes, 2 * PAGE as u64);
}

#[test]
fn test_allocation_reuses_empty_siblings() {
    let (mut arena, ledger) = counting_arena();
    arena.allocate(CAPACITY).unwrap();
    arena.allocate(CAPACITY).unwrap();
    arena.allocate(CAPACITY).unwrap();
    arena.reset_all().unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::HEAD));

    arena.allocate(CAPACITY).unwrap();
    arena.allocate(CAPACITY).unwrap();
    arena.allocate(CAPACITY).unwrap();
    assert_eq!(arena.node_count(), 3);
    assert_eq!(ledger.acquired(), 3);
    assert_eq!(arena.cursor(), Some(NodeId::new(2)));
}

#[test]
fn test_oversized_node_skips_small_siblings() {
    let (mut arena, _ledger) = counting_arena();
    arena.allocate(CAPACITY).unwrap();
    arena.allocate(CAPACITY).unwrap();
    arena.reset_all().unwrap();

    // Too big for either existing node, so a third is linked after the tail.
    arena.allocate(2 * PAGE).unwrap();
    assert_eq!(arena.node_count(), 3);
    assert_eq!(arena.cursor(), Some(NodeId::new(2)));
    assert_eq!(arena.tail().unwrap().capacity(), 3 * PAGE - NODE_HEADER_SIZE);
    arena.verify().unwrap();
}

#[test]
fn test_free_tail_failures_change_nothing() {
    let (mut arena, _ledger) = counting_arena();
    arena.allocate(3000).unwrap();
    arena.allocate(3000).unwrap();
    let before = offsets(&arena);

    let err = arena.free_tail(6001).unwrap_err();
    assert_eq!(
        err,
        StrataError::InsufficientAllocation {
            requested: 6001,
            available: 6000,
        }
    );
    assert_eq!(offsets(&arena), before);
    assert_eq!(arena.cursor(), Some(NodeId::new(1)));

    arena.seek(NodeId::HEAD).unwrap();
    let err = arena.free_tail(10).unwrap_err();
    assert_eq!(err.code(), "E008");
    assert_eq!(offsets(&arena), before);
}

#[test]
fn test_free_tail_walks_back() {
    let (mut arena, _ledger) = counting_arena();
    arena.allocate(3000).unwrap();
    arena.allocate(3000).unwrap();

    arena.free_tail(3500).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::HEAD));
    assert_eq!(offsets(&arena), vec![2500, 0]);

    // Exactly emptying a node stops on it.
    arena.allocate(3000).unwrap();
    arena.free_tail(3000).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::new(1)));
    assert_eq!(offsets(&arena), vec![2500, 0]);
}

#[test]
fn test_free_tail_of_everything_returns_to_head() {
    let (mut arena, ledger) = counting_arena();

    // Too large for the head, so the head stays empty.
    arena.allocate(5000).unwrap();
    arena.allocate(CAPACITY).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::new(2)));
    assert_eq!(offsets(&arena), vec![0, 5000, CAPACITY]);

    let total = arena.stats().bytes_in_use;
    arena.free_tail(total).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::HEAD));
    assert_eq!(offsets(&arena), vec![0, 0, 0]);
    assert_eq!(ledger.released(), 0);

    // The next allocation starts from the head again.
    arena.allocate(10).unwrap();
    assert_eq!(offsets(&arena), vec![10, 0, 0]);
}

#[test]
fn test_checkpoint_from_another_chain_is_rejected() {
    let (mut arena, _ledger) = counting_arena();
    let (other, _other_ledger) = counting_arena();
    let foreign = other.checkpoint().unwrap();

    arena.allocate(10).unwrap();
    let err = arena.restore(foreign).unwrap_err();
    assert_eq!(err, StrataError::InvalidCheckpoint { checkpoint: foreign });
    assert_eq!(offsets(&arena), vec![10]);
}

#[test]
fn test_checkpoint_at_end_of_full_node() {
    let (mut arena, _ledger) = counting_arena();
    arena.allocate(CAPACITY).unwrap();
    let full = arena.checkpoint().unwrap();

    arena.allocate(100).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::new(1)));

    arena.restore(full).unwrap();
    assert_eq!(arena.cursor(), Some(NodeId::HEAD));
    assert_eq!(offsets(&arena), vec![CAPACITY, 0]);
}

#[test]
fn test_destroyed_arena_rejects_operations() {
    let (mut arena, _ledger) = counting_arena();
    let mark = arena.checkpoint().unwrap();
    arena.destroy();

    for err in [
        arena.allocate(1).unwrap_err(),
        arena.allocate_zeroed(1).unwrap_err(),
        arena.free_tail(0).unwrap_err(),
        arena.reset_all().unwrap_err(),
        arena.restore(mark).unwrap_err(),
        arena.checkpoint().unwrap_err(),
        arena.verify().unwrap_err(),
    ] {
        assert_eq!(err.code(), "E004");
        assert!(err.is_usage_error());
    }
    assert!(arena.scratch(|_| ()).is_err());
}

#[test]
fn test_zero_size_allocation() {
    let (mut arena, _ledger) = counting_arena();
    arena.allocate(7).unwrap();
    let before = arena.checkpoint().unwrap();

    let ptr = arena.allocate(0).unwrap();
    assert_eq!(ptr.as_ptr() as usize, before.addr());
    assert_eq!(offsets(&arena), vec![7]);
}

#[test]
fn test_over_aligned_requests() {
    let (mut arena, _ledger) = counting_arena();
    arena.allocate(1).unwrap();

    let ptr = arena.allocate_aligned(100, 256).unwrap();
    assert_eq!(ptr.as_ptr() as usize % 256, 0);

    // Too much padding for the head: the fresh node leaves room to align.
    arena.allocate_aligned(CAPACITY - 300, 1).unwrap();
    let ptr = arena.allocate_aligned(CAPACITY - 300, 2048).unwrap();
    assert_eq!(ptr.as_ptr() as usize % 2048, 0);
    arena.verify().unwrap();

    let err = arena.allocate_aligned(8, 2 * PAGE).unwrap_err();
    assert_eq!(err.code(), "E005");
}

#[test]
fn test_system_pages_from_config() {
    for backing in [PageBacking::Mapped, PageBacking::Heap] {
        let config = ArenaConfig::default()
            .with_backing(backing)
            .with_page_size(8192);
        let mut arena = Arena::with_config(&config).unwrap();
        assert_eq!(arena.source().backing(), backing);
        assert_eq!(arena.page_size(), 8192);

        arena.allocate(20_000).unwrap();
        assert_eq!(arena.node_count(), 2);
        arena.verify().unwrap();

        let stats = arena.stats();
        assert_eq!(stats.block_bytes, 8192 + 3 * 8192);
        assert!(stats.utilization() > 0.0);
    }
}

#[test]
fn test_budget_from_config() {
    let config = ArenaConfig::default()
        .with_backing(PageBacking::Heap)
        .with_page_size(PAGE)
        .with_max_bytes(PAGE as u64);
    let mut arena = Arena::with_config(&config).unwrap();
    assert_eq!(arena.max_bytes(), Some(PAGE as u64));
    assert!(arena.allocate(PAGE).is_err());
    assert_eq!(arena.node_count(), 1);
}

#[test]
fn test_heap_source_directly() {
    let mut arena = Arena::with_source(HeapPages::with_page_size(PAGE).unwrap()).unwrap();
    let first = arena.allocate(64).unwrap();
    let second = arena.allocate(64).unwrap();
    assert_eq!(second.as_ptr() as usize - first.as_ptr() as usize, 64);
}
