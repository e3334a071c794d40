//! Strata Core Library
//!
//! A region allocator built from a chain of page-backed nodes, plus the
//! collections and self-check harness that live on top of it.
//!
//! # Overview
//!
//! Memory is handed out by bumping an offset inside the current node. When a
//! request does not fit, the arena moves to the next node, creating one from
//! fresh pages if needed. Nothing is freed individually: callers release the
//! most recent bytes with `free_tail`, roll back to a `Checkpoint`, or reset
//! the whole chain.
//!
//! # Key Components
//!
//! - **Arena**: The node chain, bump allocation and rollback
//! - **Collections**: Growable arrays, ring buffers and strings in arena memory
//! - **Testing**: Checkpoint-isolated test suites and an instrumented page source
//! - **Types**: Node identifiers and checkpoint markers
//!
//! # Example
//!
//! ```no_run
//! use strata_core::prelude::*;
//!
//! let mut arena = Arena::with_config(&ArenaConfig::default())?;
//! let mark = arena.checkpoint()?;
//!
//! let ptr = arena.allocate(128)?;
//! assert_eq!(ptr.as_ptr() as usize % 16, 0);
//!
//! arena.restore(mark)?;
//! assert_eq!(arena.stats().bytes_in_use, 0);
//! # Ok::<(), StrataError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod collections;
pub mod error;
pub mod prelude;
pub mod testing;
pub mod types;

// Re-export key types at crate root for convenience
pub use arena::{Arena, ArenaCell, ArenaConfig, PageBacking};
pub use error::{Result, StrataError};
pub use types::{Checkpoint, NodeId};
