//! UTF-8 string over arena storage.

use super::array::ArenaArray;
use crate::arena::{ArenaCell, PageSource, SystemPages};
use crate::error::Result;
use std::fmt;
use std::ops::Deref;

/// An owned UTF-8 string whose bytes live in an arena.
///
/// Only whole `str`s and `char`s are ever appended, so the bytes are valid
/// UTF-8 at all times.
pub struct ArenaString<'a, S: PageSource = SystemPages> {
    bytes: ArenaArray<'a, u8, S>,
}

impl<'a, S: PageSource> ArenaString<'a, S> {
    /// Create an empty string bound to `arena`.
    pub fn new_in(arena: &'a ArenaCell<S>) -> Self {
        Self {
            bytes: ArenaArray::new_in(arena),
        }
    }

    /// Copy `text` into `arena`.
    pub fn copy_from_str(arena: &'a ArenaCell<S>, text: &str) -> Result<Self> {
        let mut bytes = ArenaArray::with_capacity_in(arena, text.len())?;
        bytes.extend_from_slice(text.as_bytes())?;
        Ok(Self { bytes })
    }

    /// Deep-copy `other` into `arena`.
    pub fn copy_from(arena: &'a ArenaCell<S>, other: &ArenaString<'_, S>) -> Result<Self> {
        Self::copy_from_str(arena, other.as_str())
    }

    /// Append a string slice.
    pub fn push_str(&mut self, text: &str) -> Result<()> {
        self.bytes.extend_from_slice(text.as_bytes())
    }

    /// Append a character.
    pub fn push(&mut self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.push_str(ch.encode_utf8(&mut buf))
    }

    /// View as `&str`.
    pub fn as_str(&self) -> &str {
        // SAFETY: only valid UTF-8 is ever appended.
        unsafe { std::str::from_utf8_unchecked(&self.bytes) }
    }

    /// View as `&mut str`.
    pub fn as_mut_str(&mut self) -> &mut str {
        // SAFETY: as in `as_str`; `&mut str` cannot break UTF-8 from safe code.
        unsafe { std::str::from_utf8_unchecked_mut(&mut self.bytes) }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the string is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes the current buffer can hold.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Truncate to zero length.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl<S: PageSource> Deref for ArenaString<'_, S> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<S: PageSource> fmt::Display for ArenaString<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<S: PageSource> fmt::Debug for ArenaString<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<S: PageSource> PartialEq<str> for ArenaString<'_, S> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<S: PageSource> PartialEq<&str> for ArenaString<'_, S> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<S: PageSource> PartialEq for ArenaString<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<S: PageSource> Eq for ArenaString<'_, S> {}
