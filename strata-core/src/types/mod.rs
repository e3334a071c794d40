//! Core types for strata.
//!
//! - `NodeId`: position of a node in an arena chain
//! - `Checkpoint`: opaque write-position marker used by checkpoint/restore

mod ids;
mod pointer;

pub use ids::NodeId;
pub use pointer::Checkpoint;
