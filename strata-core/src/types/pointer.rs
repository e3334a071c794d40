//! Position markers for arena rollback.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque marker of an arena's write position.
///
/// A checkpoint is the address the arena would hand out next (the cursor
/// node's data start plus its offset). Restoring a checkpoint rolls every
/// allocation made after it back, across as many nodes as it spans.
///
/// The marker is only meaningful for the arena that produced it, and only
/// while the node it points into is at or behind that arena's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Checkpoint(usize);

impl Checkpoint {
    /// Create a checkpoint from a raw address.
    ///
    /// Useful for tests and diagnostics; restoring a fabricated checkpoint
    /// fails with `InvalidCheckpoint` unless it lands inside a live node.
    #[must_use]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// Get the raw address.
    #[must_use]
    pub const fn addr(&self) -> usize {
        self.0
    }

    /// Shift the marker by a signed number of bytes.
    #[must_use]
    pub const fn offset_by(&self, delta: isize) -> Self {
        Self(self.0.wrapping_add_signed(delta))
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
