//! Prelude for convenient imports.
//!
//! # Example
//!
//! ```ignore
//! use strata_core::prelude::*;
//! ```

// Core types
pub use crate::types::{Checkpoint, NodeId};

// Error handling
pub use crate::error::{Result, StrataError};

// Arena
pub use crate::arena::{
    Arena, ArenaCell, ArenaConfig, ArenaNode, ArenaStats, PageBacking, PageSource, SystemPages,
};

// Collections
pub use crate::collections::{ArenaArray, ArenaString, FixedArray, RingBuffer};

// Testing
pub use crate::testing::{SuiteReport, TestContext, TestSuite};
