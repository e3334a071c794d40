//! Error types for strata.
//!
//! Every variant carries a stable code (`E001`, `E101`, ...) in its message
//! and through [`StrataError::code`], grouped by the layer that raises it.

use crate::types::{Checkpoint, NodeId};
use thiserror::Error;

/// The main error type for strata operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrataError {
    // =========================================================================
    // Arena Errors (E001-E099)
    // =========================================================================
    /// The page source could not supply a block, or the byte budget is spent.
    #[error("E001: Failed to allocate a block for {requested} usable bytes: {cause}")]
    AllocationFailure {
        /// Usable bytes the new node had to hold.
        requested: usize,
        /// Reason for the failure.
        cause: String,
    },

    /// `free_tail` asked for more bytes than the chain holds.
    #[error(
        "E002: Cannot free {requested} bytes: only {available} bytes are allocated up to the cursor"
    )]
    InsufficientAllocation {
        /// Number of bytes the caller asked to free.
        requested: usize,
        /// Number of bytes held from the head up to the cursor.
        available: usize,
    },

    /// A checkpoint does not fall inside any node at or behind the cursor.
    #[error("E003: Checkpoint {checkpoint} does not belong to any node behind the cursor")]
    InvalidCheckpoint {
        /// The rejected marker.
        checkpoint: Checkpoint,
    },

    /// The arena has been destroyed.
    #[error("E004: Cannot {operation}: the arena has been destroyed")]
    InvalidHandle {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// Requested alignment is not usable.
    #[error("E005: Invalid alignment {align}: must be a power of two no larger than {max}")]
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
        /// Largest alignment the arena can honour.
        max: usize,
    },

    /// A node identifier outside the chain.
    #[error("E006: Unknown node {node}: the chain has {len} nodes")]
    UnknownNode {
        /// The identifier that was looked up.
        node: NodeId,
        /// Current chain length.
        len: usize,
    },

    /// A node header or chain invariant failed verification.
    #[error("E007: Corrupt node {node}: {cause}")]
    CorruptNode {
        /// The node that failed verification.
        node: NodeId,
        /// Description of the corruption.
        cause: String,
    },

    /// `free_tail` called while a node after the cursor still holds data.
    #[error("E008: Cursor {cursor} is not the last node in use: {busy} still holds data")]
    CursorNotAtTail {
        /// Node the cursor points at.
        cursor: NodeId,
        /// First node after the cursor with a nonzero offset.
        busy: NodeId,
    },

    // =========================================================================
    // Collection Errors (E100-E199)
    // =========================================================================
    /// Collection used before being bound to an arena.
    #[error("E101: {collection} is not bound to an arena")]
    UninitializedCollection {
        /// Collection type name.
        collection: &'static str,
    },

    /// Fixed-capacity collection is full.
    #[error("E102: {collection} is full (capacity {capacity})")]
    CapacityExceeded {
        /// Collection type name.
        collection: &'static str,
        /// The fixed capacity.
        capacity: usize,
    },

    /// Index past the end of a collection.
    #[error("E103: Index {index} out of bounds for {collection} of length {len}")]
    IndexOutOfBounds {
        /// Collection type name.
        collection: &'static str,
        /// The rejected index.
        index: usize,
        /// Length the index was checked against.
        len: usize,
    },

    /// Argument rejected by a collection constructor or operation.
    #[error("E104: Invalid argument for {collection}: {cause}")]
    InvalidArgument {
        /// Collection type name.
        collection: &'static str,
        /// Why the argument was rejected.
        cause: String,
    },

    // =========================================================================
    // Configuration Errors (E200-E299)
    // =========================================================================
    /// Bad configuration value.
    #[error("E201: Invalid value '{value}' for {key}: {cause}")]
    ConfigValue {
        /// Configuration key or environment variable.
        key: String,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        cause: String,
    },
}

impl StrataError {
    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailure { .. } => "E001",
            Self::InsufficientAllocation { .. } => "E002",
            Self::InvalidCheckpoint { .. } => "E003",
            Self::InvalidHandle { .. } => "E004",
            Self::InvalidAlignment { .. } => "E005",
            Self::UnknownNode { .. } => "E006",
            Self::CorruptNode { .. } => "E007",
            Self::CursorNotAtTail { .. } => "E008",
            Self::UninitializedCollection { .. } => "E101",
            Self::CapacityExceeded { .. } => "E102",
            Self::IndexOutOfBounds { .. } => "E103",
            Self::InvalidArgument { .. } => "E104",
            Self::ConfigValue { .. } => "E201",
        }
    }

    /// Check if this error means memory could not be obtained.
    ///
    /// These are the only errors where retrying with a larger budget or a
    /// different page source can succeed.
    #[must_use]
    pub fn is_memory_error(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailure { .. } | Self::CapacityExceeded { .. }
        )
    }

    /// Check if this error is a caller mistake rather than an environmental failure.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientAllocation { .. }
                | Self::InvalidCheckpoint { .. }
                | Self::InvalidHandle { .. }
                | Self::InvalidAlignment { .. }
                | Self::UnknownNode { .. }
                | Self::CursorNotAtTail { .. }
                | Self::UninitializedCollection { .. }
                | Self::IndexOutOfBounds { .. }
                | Self::InvalidArgument { .. }
                | Self::ConfigValue { .. }
        )
    }
}

/// Result type alias for strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        let err = StrataError::InvalidHandle {
            operation: "allocate",
        };
        assert_eq!(err.code(), "E004");

        let err = StrataError::CapacityExceeded {
            collection: "FixedArray",
            capacity: 5,
        };
        assert_eq!(err.code(), "E102");
    }

    #[test]
    fn error_display() {
        let err = StrataError::InsufficientAllocation {
            requested: 64,
            available: 20,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("E002:"));
        assert!(msg.contains("64"));
        assert!(msg.contains("20"));

        let err = StrataError::InvalidCheckpoint {
            checkpoint: Checkpoint::from_addr(0x1000),
        };
        assert!(err.to_string().contains("0x00001000"));
    }

    #[test]
    fn error_classification() {
        let budget = StrataError::AllocationFailure {
            requested: 4096,
            cause: "budget exhausted".to_string(),
        };
        assert!(budget.is_memory_error());
        assert!(!budget.is_usage_error());

        let stale = StrataError::InvalidCheckpoint {
            checkpoint: Checkpoint::from_addr(1),
        };
        assert!(stale.is_usage_error());
        assert!(!stale.is_memory_error());

        let corrupt = StrataError::CorruptNode {
            node: NodeId::new(2),
            cause: "bad magic".to_string(),
        };
        assert!(!corrupt.is_usage_error());
        assert!(!corrupt.is_memory_error());
    }
}
