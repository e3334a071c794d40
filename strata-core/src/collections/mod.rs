//! Collections backed by arena memory.
//!
//! Arena-backed collections borrow an [`ArenaCell`](crate::arena::ArenaCell)
//! for their whole life, so the arena cannot roll their storage back while
//! they exist. Storage is never returned piecemeal: a buffer abandoned by
//! growth stays in the arena until the next restore or reset.
//!
//! - [`ArenaArray`]: growable array, capacity doubling from 1
//! - [`RingBuffer`]: fixed ring that overwrites its oldest item
//! - [`ArenaString`]: UTF-8 string
//! - [`FixedArray`]: heap-backed array with a hard capacity

mod array;
mod fixed;
mod ring;
mod string;

pub use array::ArenaArray;
pub use fixed::FixedArray;
pub use ring::RingBuffer;
pub use string::ArenaString;
