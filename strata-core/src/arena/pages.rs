//! Page sources: where node blocks come from.
//!
//! A [`PageSource`] hands out contiguous blocks whose length is a whole
//! multiple of its page size, and takes them back exactly once. Two sources
//! ship with the crate:
//!
//! - [`MappedPages`]: anonymous private mappings through `memmap2`
//! - [`HeapPages`]: page-aligned blocks from the global allocator, for
//!   environments where mappings are unavailable or instrumented
//!
//! [`SystemPages`] picks one of them from an [`ArenaConfig`].

use super::config::{ArenaConfig, PageBacking};
use super::header::NODE_HEADER_SIZE;
use crate::error::{Result, StrataError};
use memmap2::{MmapMut, MmapOptions};
use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;

/// Page size used when the platform cannot report one.
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// Query the platform page size.
pub fn system_page_size() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            return size as usize;
        }
    }
    FALLBACK_PAGE_SIZE
}

/// Check that `page_size` can hold a node header and still leave room for data.
pub fn validate_page_size(page_size: usize) -> Result<()> {
    if !page_size.is_power_of_two() {
        return Err(StrataError::ConfigValue {
            key: "page_size".to_string(),
            value: page_size.to_string(),
            cause: "must be a power of two".to_string(),
        });
    }
    if page_size <= NODE_HEADER_SIZE {
        return Err(StrataError::ConfigValue {
            key: "page_size".to_string(),
            value: page_size.to_string(),
            cause: format!("must be larger than the {NODE_HEADER_SIZE}-byte node header"),
        });
    }
    Ok(())
}

/// Block length for a node that must offer at least `min_usable` bytes.
///
/// Every page is charged one header's worth of bytes when counting pages, so
/// `pages = max(1, ceil(min_usable / (page_size - header)))`. The block is
/// `pages * page_size` bytes and its usable capacity is the block minus a
/// single header.
pub fn block_len_for(page_size: usize, min_usable: usize) -> Result<usize> {
    let page_usable = page_size
        .checked_sub(NODE_HEADER_SIZE)
        .filter(|usable| *usable > 0)
        .ok_or_else(|| StrataError::AllocationFailure {
            requested: min_usable,
            cause: format!("page size {page_size} cannot hold a node header"),
        })?;

    let pages = min_usable.div_ceil(page_usable).max(1);
    pages
        .checked_mul(page_size)
        .ok_or_else(|| StrataError::AllocationFailure {
            requested: min_usable,
            cause: "block length overflows the address space".to_string(),
        })
}

enum Storage {
    /// Unmapped when dropped.
    Mapped { _map: MmapMut },
    Heap(Layout),
}

/// A contiguous block of memory owned by exactly one node.
///
/// The block is returned to its source when it is passed to
/// [`PageSource::release`] or dropped; either way it is freed once.
pub struct PageBlock {
    ptr: NonNull<u8>,
    len: usize,
    storage: Storage,
}

// SAFETY: the block exclusively owns its memory; nothing else aliases it.
unsafe impl Send for PageBlock {}

impl PageBlock {
    /// Base address of the block.
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Base address as an integer.
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the block has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the block is an anonymous mapping.
    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mapped { .. })
    }
}

impl Drop for PageBlock {
    fn drop(&mut self) {
        if let Storage::Heap(layout) = self.storage {
            // SAFETY: ptr came from `alloc::alloc(layout)` and is freed only here.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

impl fmt::Debug for PageBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBlock")
            .field("addr", &format_args!("0x{:x}", self.addr()))
            .field("len", &self.len)
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

/// Supplier of node blocks.
pub trait PageSource {
    /// Granularity of every block this source hands out.
    fn page_size(&self) -> usize;

    /// Acquire a block of at least `NODE_HEADER_SIZE + min_usable` bytes,
    /// rounded to whole pages. Contents are unspecified.
    fn acquire(&mut self, min_usable: usize) -> Result<PageBlock>;

    /// Return a block to the source.
    fn release(&mut self, block: PageBlock) {
        drop(block);
    }
}

/// Anonymous private mappings.
#[derive(Debug, Clone)]
pub struct MappedPages {
    page_size: usize,
}

impl MappedPages {
    /// Map blocks in units of the platform page size.
    pub fn new() -> Self {
        Self {
            page_size: system_page_size(),
        }
    }

    /// Map blocks in units of `page_size`.
    pub fn with_page_size(page_size: usize) -> Result<Self> {
        validate_page_size(page_size)?;
        Ok(Self { page_size })
    }
}

impl Default for MappedPages {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for MappedPages {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn acquire(&mut self, min_usable: usize) -> Result<PageBlock> {
        let len = block_len_for(self.page_size, min_usable)?;

        let mut map = MmapOptions::new().len(len).map_anon().map_err(|e| {
            StrataError::AllocationFailure {
                requested: min_usable,
                cause: format!("anonymous mapping of {len} bytes failed: {e}"),
            }
        })?;

        let ptr = NonNull::new(map.as_mut_ptr()).ok_or_else(|| StrataError::AllocationFailure {
            requested: min_usable,
            cause: "mapping returned a null address".to_string(),
        })?;

        tracing::trace!(len, addr = ptr.as_ptr() as usize, "mapped block");

        Ok(PageBlock {
            ptr,
            len,
            storage: Storage::Mapped { _map: map },
        })
    }

    fn release(&mut self, block: PageBlock) {
        tracing::trace!(len = block.len(), addr = block.addr(), "unmapping block");
        drop(block);
    }
}

/// Page-aligned blocks from the global allocator.
#[derive(Debug, Clone)]
pub struct HeapPages {
    page_size: usize,
}

impl HeapPages {
    /// Allocate blocks in units of the platform page size.
    pub fn new() -> Self {
        Self {
            page_size: system_page_size(),
        }
    }

    /// Allocate blocks in units of `page_size`.
    pub fn with_page_size(page_size: usize) -> Result<Self> {
        validate_page_size(page_size)?;
        Ok(Self { page_size })
    }
}

impl Default for HeapPages {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for HeapPages {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn acquire(&mut self, min_usable: usize) -> Result<PageBlock> {
        let len = block_len_for(self.page_size, min_usable)?;
        let layout = Layout::from_size_align(len, self.page_size).map_err(|e| {
            StrataError::AllocationFailure {
                requested: min_usable,
                cause: format!("invalid block layout: {e}"),
            }
        })?;

        // SAFETY: layout has a nonzero size (at least one page).
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| StrataError::AllocationFailure {
            requested: min_usable,
            cause: format!("global allocator refused {len} bytes"),
        })?;

        tracing::trace!(len, addr = raw as usize, "allocated heap block");

        Ok(PageBlock {
            ptr,
            len,
            storage: Storage::Heap(layout),
        })
    }

    fn release(&mut self, block: PageBlock) {
        tracing::trace!(len = block.len(), addr = block.addr(), "freeing heap block");
        drop(block);
    }
}

/// The page source selected by an [`ArenaConfig`].
#[derive(Debug, Clone)]
pub enum SystemPages {
    /// Anonymous mappings.
    Mapped(MappedPages),
    /// Global allocator.
    Heap(HeapPages),
}

impl SystemPages {
    /// Build the source a configuration asks for.
    pub fn from_config(config: &ArenaConfig) -> Result<Self> {
        let page_size = config.page_size.unwrap_or_else(system_page_size);
        Ok(match config.backing {
            PageBacking::Mapped => Self::Mapped(MappedPages::with_page_size(page_size)?),
            PageBacking::Heap => Self::Heap(HeapPages::with_page_size(page_size)?),
        })
    }

    /// The backing this source draws from.
    pub fn backing(&self) -> PageBacking {
        match self {
            Self::Mapped(_) => PageBacking::Mapped,
            Self::Heap(_) => PageBacking::Heap,
        }
    }
}

impl Default for SystemPages {
    fn default() -> Self {
        Self::Mapped(MappedPages::new())
    }
}

impl PageSource for SystemPages {
    fn page_size(&self) -> usize {
        match self {
            Self::Mapped(pages) => pages.page_size(),
            Self::Heap(pages) => pages.page_size(),
        }
    }

    fn acquire(&mut self, min_usable: usize) -> Result<PageBlock> {
        match self {
            Self::Mapped(pages) => pages.acquire(min_usable),
            Self::Heap(pages) => pages.acquire(min_usable),
        }
    }

    fn release(&mut self, block: PageBlock) {
        match self {
            Self::Mapped(pages) => pages.release(block),
            Self::Heap(pages) => pages.release(block),
        }
    }
}
