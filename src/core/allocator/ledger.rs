use super::memory::{AllocatedSegment, Handle, Segment};

/// Segments currently handed out to callers. Lookups go by
/// handle; the insertion order is kept only so that listings
/// come out in the order allocations were made.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    entries: Vec<AllocatedSegment>,
}

impl Ledger {
    pub fn record(&mut self, segment: Segment, handle: Handle) {
        self.entries.push(AllocatedSegment { segment, handle });
    }

    pub fn find(&self, handle: Handle) -> Option<&AllocatedSegment> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    /// Take the entry for `handle` out of the ledger, keeping
    /// the order of the remaining ones.
    pub fn remove(&mut self, handle: Handle) -> Option<AllocatedSegment> {
        let index = self.entries.iter().position(|entry| entry.handle == handle)?;
        Some(self.entries.remove(index))
    }

    pub fn entries(&self) -> &[AllocatedSegment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> usize {
        self.entries.iter().map(|entry| entry.segment.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::allocator::memory::Arena;

    #[test]
    fn record_find_and_remove() {
        let arena = Arena::new(64).unwrap();
        let mut ledger = Ledger::default();

        let a = arena.handle_at(0);
        let b = arena.handle_at(16);
        let c = arena.handle_at(40);
        ledger.record(Segment::new(0, 16), a);
        ledger.record(Segment::new(16, 24), b);
        ledger.record(Segment::new(40, 8), c);

        assert_eq!(ledger.find(b).map(|e| e.segment), Some(Segment::new(16, 24)));
        assert_eq!(ledger.total_size(), 48);

        assert_eq!(ledger.remove(b).map(|e| e.segment), Some(Segment::new(16, 24)));
        assert!(ledger.find(b).is_none());
        assert!(ledger.remove(b).is_none());

        // Remaining entries keep their allocation order.
        let handles: Vec<_> = ledger.entries().iter().map(|e| e.handle).collect();
        assert_eq!(handles, vec![a, c]);
    }

    #[test]
    fn unknown_handles_are_not_found() {
        let ledger = Ledger::default();

        assert!(ledger.is_empty());
        assert!(ledger.find(Handle::NULL).is_none());
    }
}
