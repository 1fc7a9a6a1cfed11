mod free_list;
mod ledger;
mod memory;

pub use free_list::{FreeList, Reinsert};
pub use ledger::Ledger;
pub use memory::{AllocatedSegment, Arena, Handle, Segment};

use crate::error::AllocError;

use log::*;

/// Snapshot of how the arena is currently split up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub arena_size: usize,
    pub free_bytes: usize,
    pub allocated_bytes: usize,
    pub free_segments: usize,
    pub allocated_segments: usize,
    /// Size of the largest free segment, i.e. the largest
    /// request that can currently succeed.
    pub largest_free: usize,
}

/// First-fit heap allocator over a fixed-size arena.
///
/// The allocator owns the arena along with its two lists: the
/// free list, sorted by address, and the ledger of segments
/// handed out to callers. Callers only ever hold `Handle`s.
pub struct Allocator {
    /// Backing memory the segments are carved from.
    arena: Arena,
    /// Free segments, sorted by address, with no two
    /// touching after a release.
    free: FreeList,
    /// Live allocations.
    ledger: Ledger,
}

impl Allocator {
    /// Create an allocator managing `arena_size` bytes. The
    /// whole arena starts out as a single free segment.
    pub fn initialize(arena_size: usize) -> Result<Self, AllocError> {
        // A free segment is never empty, so an empty arena
        // could not even be described by the free list.
        if arena_size == 0 {
            return Err(AllocError::InvalidSize(0));
        }

        let arena = Arena::new(arena_size)?;
        info!("Heap arena of {} bytes created.", arena_size);

        Ok(Self {
            arena,
            free: FreeList::spanning(arena_size),
            ledger: Ledger::default(),
        })
    }

    /// Allocate `size` bytes with a first-fit search and
    /// return the handle of the new segment.
    pub fn allocate(&mut self, size: isize) -> Result<Handle, AllocError> {
        // Zero and negative sizes are refused before looking
        // at the free list at all.
        let requested = usize::try_from(size)
            .ok()
            .filter(|&size| size > 0)
            .ok_or(AllocError::InvalidSize(size))?;

        // Walk the free list in address order and stop at the
        // first segment that is large enough. There is no
        // attempt at finding a tighter fit further along.
        let index = self
            .free
            .first_fit(requested)
            .ok_or(AllocError::OutOfMemory { requested })?;

        // The allocation takes the front of the free segment;
        // whatever is left over stays free at the same place
        // in the list.
        let segment = self.free.take_front(index, requested);
        let handle = self.arena.handle_at(segment.address);
        self.ledger.record(segment, handle);

        debug!(
            "Allocated {} bytes at address {} ({}).",
            segment.size, segment.address, handle
        );
        debug_assert!(self.check_invariants().is_ok());

        Ok(handle)
    }

    /// Give the segment behind `handle` back to the free list
    /// and merge it with any free neighbours.
    pub fn release(&mut self, handle: Handle) -> Result<(), AllocError> {
        if handle.is_null() {
            return Err(AllocError::InvalidHandle);
        }

        // Only handles present in the ledger can be released.
        // A handle released earlier is no longer there, which
        // is how most double frees are caught.
        let entry = self
            .ledger
            .remove(handle)
            .ok_or(AllocError::NotAllocated(handle))?;
        let segment = entry.segment;

        // Put the segment back in address order. If a free
        // segment already starts at this address, the memory
        // was freed before: the segment is dropped instead of
        // being listed twice.
        match self.free.reinsert(segment) {
            Reinsert::AlreadyFree => {
                warn!("Memory block at address {} already freed.", segment.address);
                Err(AllocError::DoubleFree {
                    address: segment.address,
                })
            }
            Reinsert::Inserted(_) => {
                debug!(
                    "Released {} bytes at address {} ({}).",
                    segment.size, segment.address, handle
                );
                self.coalesce();
                debug_assert!(self.check_invariants().is_ok());
                Ok(())
            }
        }
    }

    /// Merge adjacent free segments. Running it again right
    /// after has no effect.
    pub fn coalesce(&mut self) -> usize {
        self.free.coalesce()
    }

    /// Free segments in address order.
    pub fn free_list(&self) -> Vec<Segment> {
        self.free.segments().to_vec()
    }

    /// Allocated segments in allocation order.
    pub fn allocated_list(&self) -> Vec<Segment> {
        self.ledger.entries().iter().map(|entry| entry.segment).collect()
    }

    /// Live segment behind `handle`, if any.
    pub fn resolve(&self, handle: Handle) -> Option<Segment> {
        self.ledger.find(handle).map(|entry| entry.segment)
    }

    /// Bytes of the arena backing a live allocation.
    pub fn bytes(&self, handle: Handle) -> Result<&[u8], AllocError> {
        let segment = self.live_segment(handle)?;
        Ok(self.arena.slice(segment))
    }

    pub fn bytes_mut(&mut self, handle: Handle) -> Result<&mut [u8], AllocError> {
        let segment = self.live_segment(handle)?;
        Ok(self.arena.slice_mut(segment))
    }

    pub fn arena_size(&self) -> usize {
        self.arena.size()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            arena_size: self.arena.size(),
            free_bytes: self.free.total_size(),
            allocated_bytes: self.ledger.total_size(),
            free_segments: self.free.len(),
            allocated_segments: self.ledger.len(),
            largest_free: self.free.largest().map_or(0, |s| s.size),
        }
    }

    /// Verify the bookkeeping: the free list is sorted, its
    /// segments neither overlap nor touch, and free plus
    /// allocated segments tile the arena exactly.
    pub fn check_invariants(&self) -> Result<(), AllocError> {
        let corrupted =
            |message: String| -> Result<(), AllocError> { Err(AllocError::Corrupted(message)) };

        for pair in self.free.segments().windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if left.end() > right.address {
                return corrupted(format!("free segments {left:?} and {right:?} out of order"));
            }
            if left.touches(&right) {
                return corrupted(format!("free segments {left:?} and {right:?} not merged"));
            }
        }

        // Sorting every segment by address, each one has to
        // start exactly where the previous one ended, from 0
        // up to the end of the arena.
        let mut all: Vec<Segment> = self
            .free
            .segments()
            .iter()
            .copied()
            .chain(self.ledger.entries().iter().map(|entry| entry.segment))
            .collect();
        all.sort_by_key(|s| s.address);

        let mut cursor = 0;
        for segment in all {
            if segment.size == 0 {
                return corrupted(format!("empty segment at address {}", segment.address));
            }
            if segment.address != cursor {
                return corrupted(format!(
                    "expected a segment at address {cursor}, found {segment:?}"
                ));
            }
            cursor = segment.end();
        }

        if cursor != self.arena.size() {
            return corrupted(format!(
                "segments cover {cursor} bytes of a {} byte arena",
                self.arena.size()
            ));
        }

        Ok(())
    }

    fn live_segment(&self, handle: Handle) -> Result<Segment, AllocError> {
        if handle.is_null() {
            return Err(AllocError::InvalidHandle);
        }
        self.resolve(handle).ok_or(AllocError::NotAllocated(handle))
    }
}

impl Drop for Allocator {
    fn drop(&mut self) {
        debug!(
            "Heap arena destroyed ({} segments still allocated).",
            self.ledger.len()
        );
    }
}
