//! Chained bump arena.
//!
//! An [`Arena`] is a chain of nodes, each carved from one block handed out
//! by a [`PageSource`]. Allocation bumps an offset inside the cursor node
//! and spills into later nodes, linking a new one when none can hold the
//! request. Memory comes back only in bulk: from the tail
//! ([`Arena::free_tail`]), to a [`Checkpoint`](crate::types::Checkpoint)
//! ([`Arena::restore`]), all at once ([`Arena::reset_all`]), or with the
//! blocks themselves ([`Arena::destroy`]).
//!
//! # Layout
//!
//! ```text
//!  node_0 (cursor)          node_1                    node_2
//! ┌────────┬───────────┐   ┌────────┬──────────────┐  ┌────────┬───────────┐
//! │ header │ data ...  │ ⇄ │ header │ data ...     │⇄ │ header │ (empty)   │
//! └────────┴───────────┘   └────────┴──────────────┘  └────────┴───────────┘
//!  64 bytes  ↑ offset        64 bytes                   64 bytes
//! ```
//!
//! Each block is a whole number of pages. Its first `NODE_HEADER_SIZE`
//! bytes hold a [`NodeHeader`]; the rest is the node's capacity.

mod cell;
mod chain;
mod config;
mod header;
mod node;
mod pages;
mod stats;

pub use cell::ArenaCell;
pub use chain::{Arena, MAX_ALIGN, default_alignment};
pub use config::{ArenaConfig, ENV_BACKING, ENV_MAX_BYTES, ENV_PAGE_SIZE, PageBacking};
pub use header::{NODE_HEADER_SIZE, NODE_MAGIC, NODE_VERSION, NodeHeader};
pub use node::ArenaNode;
pub use pages::{
    FALLBACK_PAGE_SIZE, HeapPages, MappedPages, PageBlock, PageSource, SystemPages,
    block_len_for, system_page_size, validate_page_size,
};
pub use stats::ArenaStats;
