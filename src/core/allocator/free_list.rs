use super::memory::Segment;

use log::debug;

/// Free segments of the arena, kept sorted by address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreeList {
    segments: Vec<Segment>,
}

/// Outcome of putting a released segment back in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reinsert {
    /// The segment was inserted at this index.
    Inserted(usize),
    /// A free segment already starts at the same address, so
    /// the released one was discarded.
    AlreadyFree,
}

impl FreeList {
    /// A list with a single free segment spanning `size`
    /// bytes from address 0.
    pub fn spanning(size: usize) -> Self {
        Self {
            segments: vec![Segment::new(0, size)],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_size(&self) -> usize {
        self.segments.iter().map(|s| s.size).sum()
    }

    pub fn largest(&self) -> Option<Segment> {
        self.segments.iter().copied().max_by_key(|s| s.size)
    }

    /// Index of the first segment (lowest address) that can
    /// hold `size` bytes.
    pub fn first_fit(&self, size: usize) -> Option<usize> {
        self.segments.iter().position(|s| s.size >= size)
    }

    /// Carve `size` bytes off the front of the segment at
    /// `index` and return the carved part. The remainder keeps
    /// its place in the list, or disappears on an exact fit.
    pub fn take_front(&mut self, index: usize, size: usize) -> Segment {
        let free = &mut self.segments[index];
        let taken = Segment::new(free.address, size);

        // Moving the start of the free segment forward cannot
        // break the ordering: it still ends where it used to,
        // so it stays below the next segment.
        free.address += size;
        free.size -= size;

        if free.size == 0 {
            self.segments.remove(index);
        }

        taken
    }

    /// Put a segment back in address order. The slot is the
    /// first segment whose address is not below the new one;
    /// if that segment starts at the very same address, the
    /// memory is already free and nothing is inserted.
    pub fn reinsert(&mut self, segment: Segment) -> Reinsert {
        let index = self
            .segments
            .partition_point(|s| s.address < segment.address);

        match self.segments.get(index) {
            Some(existing) if existing.address == segment.address => Reinsert::AlreadyFree,
            _ => {
                self.segments.insert(index, segment);
                Reinsert::Inserted(index)
            }
        }
    }

    /// Merge every run of touching segments in one left to
    /// right pass. Returns the number of merges performed.
    pub fn coalesce(&mut self) -> usize {
        let mut merges = 0;
        let mut i = 0;

        while i + 1 < self.segments.len() {
            let (left, right) = (self.segments[i], self.segments[i + 1]);

            if left.touches(&right) {
                // Grow the left segment over the right one and
                // stay on it: it may now touch its new
                // neighbour as well.
                self.segments[i].size += right.size;
                self.segments.remove(i + 1);
                merges += 1;
                debug!(
                    "Merged free segment {} (+{}) into {}.",
                    right.address, right.size, left.address
                );
            } else {
                i += 1;
            }
        }

        merges
    }

    #[cfg(test)]
    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}
