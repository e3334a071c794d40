//! Built-in self-check suites.
//!
//! Exercised by `strata selftest` and by this crate's own tests. Arena cases
//! build private arenas from the suite configuration so they can inspect
//! exact node geometry; collection cases use the shared arena.

use super::context::TestContext;
use super::suite::TestSuite;
use crate::arena::{Arena, ArenaConfig, ArenaNode, NODE_HEADER_SIZE};
use crate::collections::{ArenaArray, ArenaString, FixedArray, RingBuffer};
use crate::error::Result;
use std::alloc::Layout;
use std::mem::align_of;
use std::ptr::NonNull;

/// Names accepted by [`build_suite`].
pub const SUITE_NAMES: &[&str] = &["arena", "array", "buffer", "string"];

/// Build a built-in suite by name.
pub fn build_suite(name: &str, config: &ArenaConfig) -> Option<Result<TestSuite>> {
    match name {
        "arena" => Some(arena_suite(config)),
        "array" => Some(array_suite(config)),
        "buffer" => Some(buffer_suite(config)),
        "string" => Some(string_suite(config)),
        _ => None,
    }
}

/// Chain growth, release, rollback and alignment.
pub fn arena_suite(config: &ArenaConfig) -> Result<TestSuite> {
    let mut suite = TestSuite::new("arena", config.clone())?;
    suite
        .add_test("create_arena", create_arena)
        .add_test("alloc_memory", alloc_memory)
        .add_test("zalloc_memory", zalloc_memory)
        .add_test("free_arena", free_arena)
        .add_test("scratch_pad", scratch_pad)
        .add_test("memory_alignment", memory_alignment)
        .add_test("arena_faults", arena_faults);
    Ok(suite)
}

/// Growable and fixed arrays.
pub fn array_suite(config: &ArenaConfig) -> Result<TestSuite> {
    let mut suite = TestSuite::new("array", config.clone())?;
    suite
        .add_test("dynamic_array", dynamic_array)
        .add_test("fixed_array", fixed_array)
        .add_test("clear_array", clear_array)
        .add_test("initialized_array", initialized_array)
        .add_test("copy_array", copy_array)
        .add_test("copy_slice", copy_slice)
        .add_test("array_faults", array_faults);
    Ok(suite)
}

/// Ring buffer wrap-around.
pub fn buffer_suite(config: &ArenaConfig) -> Result<TestSuite> {
    let mut suite = TestSuite::new("buffer", config.clone())?;
    suite
        .add_test("buffer", buffer)
        .add_test("wrap_buffer", wrap_buffer)
        .add_test("wrap_buffer_with_get", wrap_buffer_with_get);
    Ok(suite)
}

/// Arena strings.
pub fn string_suite(config: &ArenaConfig) -> Result<TestSuite> {
    let mut suite = TestSuite::new("string", config.clone())?;
    suite
        .add_test("string_from_str", string_from_str)
        .add_test("string_copy", string_copy);
    Ok(suite)
}

// =============================================================================
// Helpers
// =============================================================================

fn fresh_arena(ctx: &mut TestContext<'_>) -> Option<Arena> {
    let config = ctx.config();
    ctx.assert_ok(Arena::with_config(config), "create arena")
}

fn offset(arena: &Arena) -> usize {
    arena.current_node().map_or(0, ArenaNode::current_offset)
}

fn capacity(arena: &Arena) -> usize {
    arena.current_node().map_or(0, ArenaNode::capacity)
}

fn has_next(arena: &Arena) -> bool {
    arena.current_node().is_some_and(|node| node.next().is_some())
}

fn has_previous(arena: &Arena) -> bool {
    arena
        .current_node()
        .is_some_and(|node| node.previous().is_some())
}

/// Use up the cursor node exactly, without alignment padding.
fn fill_current(arena: &mut Arena) -> Result<NonNull<u8>> {
    let remaining = arena.current_node().map_or(0, ArenaNode::remaining);
    arena.allocate_aligned(remaining, 1)
}

fn is_aligned<T>(ptr: NonNull<u8>) -> bool {
    ptr.as_ptr() as usize % align_of::<T>() == 0
}

// =============================================================================
// Arena cases
// =============================================================================

fn create_arena(ctx: &mut TestContext<'_>) {
    let Some(mut arena) = fresh_arena(ctx) else {
        return;
    };
    let page_capacity = arena.page_size() - NODE_HEADER_SIZE;

    ctx.assert_eq(capacity(&arena), page_capacity, "check arena size");
    ctx.assert_eq(offset(&arena), 0, "check current offset");
    ctx.assert_false(has_next(&arena), "check next status");
    ctx.assert_false(has_previous(&arena), "check prev status");
    ctx.assert_ok(arena.verify(), "check chain verifies");

    arena.destroy();
    ctx.assert_true(arena.is_destroyed(), "check cleanup");
}

fn alloc_memory(ctx: &mut TestContext<'_>) {
    let Some(mut arena) = fresh_arena(ctx) else {
        return;
    };
    let page_capacity = arena.page_size() - NODE_HEADER_SIZE;
    let float = size_of::<f32>();

    let Some(a) = ctx.assert_ok(arena.allocate(20 * float), "check allocation status") else {
        return;
    };
    ctx.assert_true(is_aligned::<f32>(a), "check returned memory is aligned");
    ctx.assert_eq(capacity(&arena), page_capacity, "check arena size");
    ctx.assert_true(offset(&arena) >= 20 * float, "check current offset");
    ctx.assert_false(has_next(&arena), "check next status");
    ctx.assert_false(has_previous(&arena), "check prev status");
    // SAFETY: `a` holds 20 floats.
    unsafe { a.cast::<f32>().add(19).write(1.0) };

    let b = ctx.assert_ok(arena.allocate(10 * float), "check allocation status");
    ctx.assert_true(b.is_some_and(is_aligned::<f32>), "check returned memory is aligned");
    ctx.assert_true(offset(&arena) >= 30 * float, "check current offset");
    ctx.assert_false(has_next(&arena), "check next status");

    ctx.assert_ok(fill_current(&mut arena), "check filling the node");
    let c = ctx.assert_ok(arena.allocate(40 * float), "check allocation status");
    ctx.assert_true(c.is_some_and(is_aligned::<f32>), "check returned memory is aligned");
    ctx.assert_eq(capacity(&arena), page_capacity, "check arena size");
    ctx.assert_true(offset(&arena) >= 40 * float, "check current offset");
    ctx.assert_false(has_next(&arena), "check next status");
    ctx.assert_true(has_previous(&arena), "check prev status");

    ctx.assert_ok(fill_current(&mut arena), "check filling the node");
    let d = ctx.assert_ok(arena.allocate(50 * float), "check allocation status");
    ctx.assert_true(d.is_some_and(is_aligned::<f32>), "check returned memory is aligned");
    ctx.assert_true(offset(&arena) >= 50 * float, "check current offset");
    ctx.assert_eq(arena.node_count(), 3, "check chain length");

    let page = arena.page_size();
    let e = ctx.assert_ok(arena.allocate(2 * page), "check oversized allocation");
    ctx.assert_true(e.is_some_and(is_aligned::<f32>), "check returned memory is aligned");
    ctx.assert_eq(
        capacity(&arena),
        3 * page - NODE_HEADER_SIZE,
        "check oversized node size",
    );
    ctx.assert_ok(arena.verify(), "check chain verifies");
}

fn zalloc_memory(ctx: &mut TestContext<'_>) {
    let Some(mut arena) = fresh_arena(ctx) else {
        return;
    };
    let float = size_of::<f32>();

    // Dirty the bytes first so zeroing is observable.
    if let Some(dirty) = ctx.assert_ok(arena.allocate(20 * float), "check allocation status") {
        // SAFETY: `dirty` holds 20 floats' worth of bytes.
        unsafe { dirty.as_ptr().write_bytes(0xFF, 20 * float) };
    }
    ctx.assert_ok(arena.reset_all(), "check reset");

    let Some(a) = ctx.assert_ok(arena.allocate_zeroed(20 * float), "check allocation status")
    else {
        return;
    };
    ctx.assert_true(offset(&arena) >= 20 * float, "check current offset");
    // SAFETY: `a` holds 20 zeroed floats.
    let values = unsafe { std::slice::from_raw_parts(a.cast::<f32>().as_ptr(), 20) };
    ctx.assert_eq(values[0], 0.0, "check first value");
    ctx.assert_eq(values[19], 0.0, "check 20th value");
}

fn free_arena(ctx: &mut TestContext<'_>) {
    let Some(mut arena) = fresh_arena(ctx) else {
        return;
    };
    let float = size_of::<f32>();

    ctx.assert_ok(arena.allocate(20 * float), "check allocation status");
    ctx.assert_true(offset(&arena) >= 20 * float, "check the offset now");

    let buffer = capacity(&arena) - offset(&arena);
    ctx.assert_ok(fill_current(&mut arena), "check filling the node");

    ctx.assert_ok(arena.allocate(40 * float), "check allocation status");
    ctx.assert_true(offset(&arena) >= 40 * float, "check offset");
    ctx.assert_false(has_next(&arena), "check next status");
    ctx.assert_true(has_previous(&arena), "check prev status");

    // Within the tail node.
    ctx.assert_ok(arena.free_tail(15 * float), "check free within a node");
    ctx.assert_true(offset(&arena) >= 25 * float, "check the offset");
    ctx.assert_true(has_previous(&arena), "check prev status");

    // Across the boundary back into the head.
    ctx.assert_ok(
        arena.free_tail(35 * float + buffer),
        "check free across nodes",
    );
    ctx.assert_true(offset(&arena) >= 10 * float, "check the offset");
    ctx.assert_true(has_next(&arena), "check next status");
    ctx.assert_false(has_previous(&arena), "check prev status");

    ctx.assert_ok(arena.allocate(40 * float), "check allocation status");
    ctx.assert_ok(arena.allocate(40 * float), "check allocation status");
    ctx.assert_ok(arena.reset_all(), "check whole arena free");
    ctx.assert_eq(offset(&arena), 0, "check that offset has cleared");
    ctx.assert_eq(arena.stats().bytes_in_use, 0, "check every node cleared");
    ctx.assert_true(has_next(&arena), "check next status");
    ctx.assert_false(has_previous(&arena), "check prev status");
}

fn scratch_pad(ctx: &mut TestContext<'_>) {
    let Some(mut arena) = fresh_arena(ctx) else {
        return;
    };
    let float = size_of::<f32>();

    ctx.assert_ok(arena.allocate(20 * float), "check allocation status");
    let old_start = arena.current_node().map(ArenaNode::data_start);

    let Some(mark) = ctx.assert_ok(arena.checkpoint(), "check scratch pad start") else {
        return;
    };

    ctx.assert_ok(arena.allocate(40 * float), "check allocation status");
    ctx.assert_ok(fill_current(&mut arena), "check filling the node");
    ctx.assert_ok(arena.allocate(40 * float), "check allocation status");
    ctx.assert_true(offset(&arena) >= 40 * float, "check arena current offset");
    ctx.assert_false(has_next(&arena), "check that next node is empty");
    ctx.assert_true(has_previous(&arena), "check that the prev node is set");

    ctx.assert_ok(arena.restore(mark), "check scratch pad restore");
    ctx.assert_eq(offset(&arena), 20 * float, "check that the offset is restored");
    ctx.assert_true(has_next(&arena), "check that the next node is kept");
    ctx.assert_false(has_previous(&arena), "check that there is no prev node now");
    ctx.assert_eq(
        arena.current_node().map(ArenaNode::data_start),
        old_start,
        "check that the arena is back where it started",
    );

    let rolled_back = arena.scratch(|arena| arena.allocate(3 * arena.page_size()).is_ok());
    ctx.assert_eq(rolled_back, Ok(true), "check scratch closure");
    ctx.assert_eq(offset(&arena), 20 * float, "check scratch closure rolled back");
}

fn memory_alignment(ctx: &mut TestContext<'_>) {
    let Some(mut arena) = fresh_arena(ctx) else {
        return;
    };

    let a = ctx.assert_ok(arena.allocate(size_of::<u32>()), "check allocation status");
    ctx.assert_true(a.is_some_and(is_aligned::<u32>), "check returned memory is aligned");
    ctx.assert_true(offset(&arena) >= size_of::<u32>(), "check current offset");

    let b = ctx.assert_ok(arena.allocate(1), "check allocation status");
    ctx.assert_true(b.is_some_and(is_aligned::<u8>), "check returned memory is aligned");
    let c = ctx.assert_ok(arena.allocate(1), "check allocation status");
    ctx.assert_true(c.is_some_and(is_aligned::<u8>), "check returned memory is aligned");

    let d = ctx.assert_ok(arena.allocate(size_of::<u64>()), "check allocation status");
    ctx.assert_true(d.is_some_and(is_aligned::<u64>), "check returned memory is aligned");

    let e = ctx.assert_ok(
        arena.allocate_layout(Layout::new::<[u128; 3]>()),
        "check layout allocation",
    );
    ctx.assert_true(e.is_some_and(is_aligned::<u128>), "check layout alignment");
}

fn arena_faults(ctx: &mut TestContext<'_>) {
    let Some(mut arena) = fresh_arena(ctx) else {
        return;
    };

    ctx.assert_err(arena.free_tail(100), "check freeing too much memory");
    ctx.assert_err(arena.allocate_aligned(8, 3), "check bad alignment");

    let Some(stored) = ctx.assert_ok(arena.checkpoint(), "check checkpoint") else {
        return;
    };
    ctx.assert_err(arena.restore(stored.offset_by(-1)), "check bad stored pointer");

    arena.destroy();
    arena.destroy();
    ctx.assert_true(arena.is_destroyed(), "check double destroy is harmless");
    ctx.assert_err(arena.allocate(1), "check safe absent returns");
    ctx.assert_err(arena.free_tail(1), "check safe absent returns");
    ctx.assert_err(arena.restore(stored), "check safe absent returns");
    ctx.assert_err(arena.reset_all(), "check safe absent returns");
}

// =============================================================================
// Array cases
// =============================================================================

fn dynamic_array(ctx: &mut TestContext<'_>) {
    let mut collection = ArenaArray::new_in(ctx.arena());
    for value in [5, 7, 9, 1, 2, 3] {
        ctx.assert_ok(collection.push(value), "status check");
    }
    ctx.assert_eq(collection.as_slice(), &[5, 7, 9, 1, 2, 3][..], "check items");
    ctx.assert_eq(collection.len(), 6, "check size");
    ctx.assert_eq(collection.capacity(), 8, "check alloc'ed size");
}

fn fixed_array(ctx: &mut TestContext<'_>) {
    let Some(mut collection) = ctx.assert_ok(FixedArray::<f32>::with_capacity(1024), "status check")
    else {
        return;
    };
    ctx.assert_ok(collection.push(1.0), "status check");
    ctx.assert_ok(collection.push(5.0), "status check");
    ctx.assert_eq(collection[0], 1.0, "check first item");
    ctx.assert_eq(collection[1], 5.0, "check second item");
    ctx.assert_eq(collection.len(), 2, "check size");
    ctx.assert_eq(collection.capacity(), 1024, "check alloc'ed size");
}

fn clear_array(ctx: &mut TestContext<'_>) {
    let mut collection = ArenaArray::new_in(ctx.arena());
    for value in [5, 7, 9, 1, 2] {
        ctx.assert_ok(collection.push(value), "status check");
    }
    ctx.assert_eq(collection.len(), 5, "check that the initial size is expected");
    collection.clear();
    ctx.assert_eq(collection.len(), 0, "check that clear worked");
    ctx.assert_eq(collection.capacity(), 8, "check that the buffer is kept");
}

fn initialized_array(ctx: &mut TestContext<'_>) {
    let mut collection: ArenaArray<'_, i32> = ArenaArray::new();
    ctx.assert_false(
        collection.is_initialized(),
        "check that array is not showing as initialized",
    );
    collection.init(ctx.arena());
    ctx.assert_true(
        collection.is_initialized(),
        "check that array is showing as initialized",
    );
}

fn copy_array(ctx: &mut TestContext<'_>) {
    let mut first = ArenaArray::new_in(ctx.arena());
    for value in [5, 7, 9, 1, 2] {
        ctx.assert_ok(first.push(value), "status check");
    }
    let mut second = ArenaArray::new_in(ctx.arena());
    ctx.assert_ok(second.copy_from(&first), "status check");
    ctx.assert_eq(first.len(), second.len(), "check that both are the same size");
    ctx.assert_eq(first.as_slice(), second.as_slice(), "check that both have the same values");
}

fn copy_slice(ctx: &mut TestContext<'_>) {
    let source = ['a', 'k', 's', 'q', 'i'];
    let mut collection: ArenaArray<'_, char> = ArenaArray::new_in(ctx.arena());
    ctx.assert_ok(collection.copy_from(&source), "status check");
    ctx.assert_eq(collection.as_slice(), &source[..], "check that both have the same values");
}

fn array_faults(ctx: &mut TestContext<'_>) {
    let mut unbound: ArenaArray<'_, i32> = ArenaArray::new();
    unbound.clear();
    ctx.assert_err(unbound.push(5), "check push on unbound array fails");
    ctx.assert_false(unbound.is_initialized(), "check array is still not initialized");

    let mut target: ArenaArray<'_, i32> = ArenaArray::new();
    ctx.assert_err(target.copy_from(&[5, 7]), "check copy into unbound array fails");
    ctx.assert_true(target.is_empty(), "check failed copy leaves the array empty");
}

// =============================================================================
// Buffer cases
// =============================================================================

fn filled_ring<'a>(ctx: &mut TestContext<'a>, values: &[i32]) -> Option<RingBuffer<'a, i32>> {
    let arena = ctx.arena();
    let mut ring = ctx.assert_ok(RingBuffer::with_capacity(arena, 5), "status check")?;
    for value in values {
        ring.push(*value);
    }
    Some(ring)
}

fn buffer(ctx: &mut TestContext<'_>) {
    let Some(ring) = filled_ring(ctx, &[5, 7, 9, 1, 2]) else {
        return;
    };
    ctx.assert_eq(ring.slots(), &[5, 7, 9, 1, 2][..], "check items");
    ctx.assert_eq(ring.len(), 5, "check size");
    ctx.assert_eq(ring.capacity(), 5, "check alloc'ed size");
}

fn wrap_buffer(ctx: &mut TestContext<'_>) {
    let Some(ring) = filled_ring(ctx, &[5, 7, 9, 1, 2, 3]) else {
        return;
    };
    ctx.assert_eq(ring.slots(), &[3, 7, 9, 1, 2][..], "check items");
    ctx.assert_eq(ring.len(), 5, "check size");
    ctx.assert_eq(ring.capacity(), 5, "check alloc'ed size");
}

fn wrap_buffer_with_get(ctx: &mut TestContext<'_>) {
    let Some(ring) = filled_ring(ctx, &[5, 7, 9, 1, 2, 3]) else {
        return;
    };
    ctx.assert_eq(ring.get(0), Ok(Some(7)), "check first item");
    ctx.assert_eq(ring.get(1), Ok(Some(9)), "check second item");
    ctx.assert_eq(ring.get(2), Ok(Some(1)), "check third item");
    ctx.assert_eq(ring.get(3), Ok(Some(2)), "check fourth item");
    ctx.assert_eq(ring.get(4), Ok(Some(3)), "check fifth item");
    ctx.assert_err(ring.get(5), "check get past capacity fails");
    ctx.assert_eq(ring.len(), 5, "check size");
}

// =============================================================================
// String cases
// =============================================================================

fn string_from_str(ctx: &mut TestContext<'_>) {
    let arena = ctx.arena();
    let Some(text) = ctx.assert_ok(
        ArenaString::copy_from_str(arena, "test string"),
        "check string from str",
    ) else {
        return;
    };
    ctx.assert_eq(text.as_str(), "test string", "check the string contents");
    ctx.assert_eq(text.len(), 11, "check the string length");
}

fn string_copy(ctx: &mut TestContext<'_>) {
    let arena = ctx.arena();
    let Some(original) = ctx.assert_ok(
        ArenaString::copy_from_str(arena, "test string"),
        "check string from str",
    ) else {
        return;
    };
    let Some(mut copy) = ctx.assert_ok(
        ArenaString::copy_from(arena, &original),
        "check string copy",
    ) else {
        return;
    };
    ctx.assert_eq(copy.as_str(), "test string", "check the copy");

    copy.as_mut_str()[..1].make_ascii_uppercase();
    ctx.assert_eq(copy.as_str(), "Test string", "check the copy changes");
    ctx.assert_eq(original.as_str(), "test string", "check the original doesn't change");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::PageBacking;

    fn run_all(config: &ArenaConfig) {
        for name in SUITE_NAMES {
            let mut suite = build_suite(name, config).unwrap().unwrap();
            let report = suite.run().unwrap();
            assert!(report.is_success(), "{report}");
            assert_eq!(report.total(), suite.len());
        }
    }

    #[test]
    fn builtin_suites_pass_on_mapped_pages() {
        run_all(&ArenaConfig::default());
    }

    #[test]
    fn builtin_suites_pass_on_heap_pages() {
        run_all(&ArenaConfig::default().with_backing(PageBacking::Heap));
    }

    #[test]
    fn builtin_suites_pass_on_large_pages() {
        run_all(&ArenaConfig::default().with_page_size(1 << 16));
    }

    #[test]
    fn unknown_suite() {
        assert!(build_suite("network", &ArenaConfig::default()).is_none());
    }
}
