//! Strongly-typed identifiers for arena entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a node within an arena chain.
///
/// Nodes are only ever appended, so the identifier is the node's position
/// counted from the head of the chain. Node `n` links back to `n - 1` and
/// forward to `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// The head of every chain.
    pub const HEAD: Self = Self(0);

    /// Create a node ID from a chain position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the chain position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }

    /// The node linked before this one, if any.
    #[must_use]
    pub const fn previous(&self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(index) => Some(Self(index)),
            None => None,
        }
    }

    /// The node that would be linked after this one.
    #[must_use]
    pub const fn following(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Check if this is the head of the chain.
    #[must_use]
    pub const fn is_head(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
