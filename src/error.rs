use crate::core::allocator::Handle;

use thiserror::Error;

/// Everything that can go wrong while talking to the heap
/// allocator. None of these errors leave the allocator in an
/// inconsistent state: the request is simply refused (or, for
/// a double free, the redundant segment is dropped).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The requested size is zero or negative.
    #[error("cannot allocate {0} bytes: size must be positive")]
    InvalidSize(isize),
    /// No free segment is large enough for the request, or
    /// the backing arena could not be acquired.
    #[error("out of memory: cannot provide {requested} bytes")]
    OutOfMemory { requested: usize },
    /// The null handle was passed to `release`.
    #[error("attempted to free a null handle")]
    InvalidHandle,
    /// The handle is not in the allocated ledger (stale,
    /// foreign or already released).
    #[error("attempted to free unallocated memory ({0})")]
    NotAllocated(Handle),
    /// The released address is already the start of a free
    /// segment.
    #[error("memory block at address {address} already freed")]
    DoubleFree { address: usize },
    /// The allocator bookkeeping broke one of its invariants.
    #[error("heap corrupted: {0}")]
    Corrupted(String),
}

impl AllocError {
    /// A double free is reported but the allocator recovers
    /// from it, so callers may treat it as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, AllocError::DoubleFree { .. })
    }
}
