//! Arena usage snapshot.

use serde::Serialize;
use std::fmt;

/// Point-in-time view of an arena chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArenaStats {
    /// Nodes in the chain.
    pub node_count: usize,
    /// Position of the cursor node.
    pub cursor: usize,
    /// Sum of every node's offset, alignment padding included.
    pub bytes_in_use: usize,
    /// Sum of every node's capacity.
    pub usable_capacity: usize,
    /// Sum of every block's length, headers included.
    pub block_bytes: u64,
    /// Page size of the source.
    pub page_size: usize,
    /// Byte budget, if any.
    pub max_bytes: Option<u64>,
}

impl ArenaStats {
    /// Fraction of usable capacity currently handed out.
    pub fn utilization(&self) -> f64 {
        if self.usable_capacity == 0 {
            0.0
        } else {
            self.bytes_in_use as f64 / self.usable_capacity as f64
        }
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} node(s), cursor at node_{}, {}/{} bytes in use ({:.1}%), {} block bytes",
            self.node_count,
            self.cursor,
            self.bytes_in_use,
            self.usable_capacity,
            self.utilization() * 100.0,
            self.block_bytes,
        )
    }
}
