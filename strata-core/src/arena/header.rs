//! Node header structure.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Magic number stamped at the start of every node block ("STRATNOD").
pub const NODE_MAGIC: u64 = u64::from_le_bytes(*b"STRATNOD");

/// Current node header format version.
pub const NODE_VERSION: u32 = 1;

/// Fixed size of the node header in bytes.
///
/// A multiple of 64 so the data area that follows inherits the block's
/// page alignment down to a cache line.
pub const NODE_HEADER_SIZE: usize = 64;

/// Header written at the base of every node block.
///
/// The header is bookkeeping for [`Arena::verify`](super::Arena::verify);
/// the chain keeps its live state (offset, links) outside the block so that
/// allocation never touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct NodeHeader {
    /// Magic number for block identification.
    pub magic: u64,
    /// Header format version.
    pub version: u32,
    /// Flags (reserved for future use).
    pub flags: u32,
    /// Position of the node in its chain when it was created.
    pub sequence: u64,
    /// Total length of the block, header included.
    pub block_len: u64,
    /// Usable bytes after the header.
    pub capacity: u64,
    /// Reserved for future use.
    pub _reserved: [u8; 24],
}

impl NodeHeader {
    /// Create a header for a block of `block_len` bytes.
    pub fn new(sequence: u64, block_len: u64) -> Self {
        Self {
            magic: NODE_MAGIC,
            version: NODE_VERSION,
            flags: 0,
            sequence,
            block_len,
            capacity: block_len.saturating_sub(NODE_HEADER_SIZE as u64),
            _reserved: [0u8; 24],
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.magic != NODE_MAGIC {
            return Err("Invalid magic number");
        }
        if self.version != NODE_VERSION {
            return Err("Unsupported node version");
        }
        if self.capacity + NODE_HEADER_SIZE as u64 != self.block_len {
            return Err("Capacity does not match block length");
        }
        Ok(())
    }

    /// Read a header from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < NODE_HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Buffer too small for header",
            ));
        }

        let mut cursor = io::Cursor::new(bytes);

        let magic = cursor.read_u64::<LittleEndian>()?;
        let version = cursor.read_u32::<LittleEndian>()?;
        let flags = cursor.read_u32::<LittleEndian>()?;
        let sequence = cursor.read_u64::<LittleEndian>()?;
        let block_len = cursor.read_u64::<LittleEndian>()?;
        let capacity = cursor.read_u64::<LittleEndian>()?;

        let mut reserved = [0u8; 24];
        cursor.read_exact(&mut reserved)?;

        Ok(Self {
            magic,
            version,
            flags,
            sequence,
            block_len,
            capacity,
            _reserved: reserved,
        })
    }

    /// Write the header into the first `NODE_HEADER_SIZE` bytes of `out`.
    pub fn write_to(&self, out: &mut [u8]) -> io::Result<()> {
        if out.len() < NODE_HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "Buffer too small for header",
            ));
        }

        let mut cursor = io::Cursor::new(&mut out[..NODE_HEADER_SIZE]);

        cursor.write_u64::<LittleEndian>(self.magic)?;
        cursor.write_u32::<LittleEndian>(self.version)?;
        cursor.write_u32::<LittleEndian>(self.flags)?;
        cursor.write_u64::<LittleEndian>(self.sequence)?;
        cursor.write_u64::<LittleEndian>(self.block_len)?;
        cursor.write_u64::<LittleEndian>(self.capacity)?;
        cursor.write_all(&self._reserved)?;

        debug_assert_eq!(cursor.position() as usize, NODE_HEADER_SIZE);

        Ok(())
    }
}
