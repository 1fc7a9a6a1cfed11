use std::fmt;

use crate::error::AllocError;

/// Contiguous span of the arena, given as an offset from the
/// start of the arena and a size in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Offset of the segment within the arena.
    pub address: usize,
    /// Size of the segment in bytes (never zero).
    pub size: usize,
}

impl Segment {
    pub fn new(address: usize, size: usize) -> Self {
        Self { address, size }
    }

    /// One past the last byte of the segment.
    pub fn end(&self) -> usize {
        self.address + self.size
    }

    /// Whether `next` starts exactly where this segment ends,
    /// so that the two could be merged into one.
    pub fn touches(&self, next: &Segment) -> bool {
        self.end() == next.address
    }

    pub fn overlaps(&self, other: &Segment) -> bool {
        self.address < other.end() && other.address < self.end()
    }
}

/// Opaque token handed out by the allocator for each live
/// allocation. Its value is the real address of the first
/// byte of the allocation, so it is never zero for a live
/// segment and can be compared or hashed freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(usize);

impl Handle {
    /// The null handle, never returned by `allocate`.
    pub const NULL: Handle = Handle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Entry of the allocated ledger: a segment in use and the
/// handle the caller received for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatedSegment {
    pub segment: Segment,
    pub handle: Handle,
}

/// Fixed-size byte region the allocator carves segments out
/// of. The arena never grows or moves, which keeps handles
/// stable for the whole lifetime of the allocator.
pub struct Arena {
    bytes: Vec<u8>,
}

impl Arena {
    pub fn new(size: usize) -> Result<Self, AllocError> {
        // Reserve the memory up front without aborting the
        // process on failure: a refused reservation is
        // reported as an out-of-memory error instead.
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| AllocError::OutOfMemory { requested: size })?;
        bytes.resize(size, 0);

        Ok(Self { bytes })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Handle of the byte at `address` (arena base plus the
    /// offset).
    pub fn handle_at(&self, address: usize) -> Handle {
        Handle(self.bytes.as_ptr() as usize + address)
    }

    pub fn slice(&self, segment: Segment) -> &[u8] {
        &self.bytes[segment.address..segment.end()]
    }

    pub fn slice_mut(&mut self, segment: Segment) -> &mut [u8] {
        &mut self.bytes[segment.address..segment.end()]
    }
}
