use heapsim::{Allocator, Handle, Segment};
use proptest::prelude::*;

const ARENA_SIZE: usize = 1024;

#[derive(Clone, Debug)]
enum Op {
    Allocate(isize),
    /// Release the live allocation at this position (modulo
    /// the number of live allocations).
    Release(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (-4isize..400).prop_map(Op::Allocate),
        any::<usize>().prop_map(Op::Release),
    ];
    prop::collection::vec(op, 0..64)
}

/// Apply `ops` and return the handles still live at the end.
fn apply(allocator: &mut Allocator, ops: &[Op]) -> Vec<Handle> {
    let mut live = Vec::new();

    for op in ops {
        match *op {
            Op::Allocate(size) => {
                if let Ok(handle) = allocator.allocate(size) {
                    live.push(handle);
                }
            }
            Op::Release(i) if !live.is_empty() => {
                let handle = live.swap_remove(i % live.len());
                allocator.release(handle).unwrap();
            }
            Op::Release(_) => {}
        }
        allocator.check_invariants().unwrap();
    }

    live
}

fn covered_bytes(allocator: &Allocator) -> usize {
    allocator
        .free_list()
        .iter()
        .chain(allocator.allocated_list().iter())
        .map(|s| s.size)
        .sum()
}

proptest! {
    #[test]
    fn free_list_stays_sorted_and_merged(ops in ops()) {
        let mut allocator = Allocator::initialize(ARENA_SIZE).unwrap();
        apply(&mut allocator, &ops);

        let free = allocator.free_list();
        for pair in free.windows(2) {
            prop_assert!(pair[0].end() < pair[1].address);
        }
        prop_assert_eq!(covered_bytes(&allocator), ARENA_SIZE);
    }

    #[test]
    fn coalescing_again_changes_nothing(ops in ops()) {
        let mut allocator = Allocator::initialize(ARENA_SIZE).unwrap();
        apply(&mut allocator, &ops);

        let before = allocator.free_list();
        prop_assert_eq!(allocator.coalesce(), 0);
        prop_assert_eq!(allocator.free_list(), before);
    }

    #[test]
    fn allocate_then_release_restores_free_list(ops in ops(), size in 1isize..200) {
        let mut allocator = Allocator::initialize(ARENA_SIZE).unwrap();
        apply(&mut allocator, &ops);

        let before = allocator.free_list();
        if let Ok(handle) = allocator.allocate(size) {
            allocator.release(handle).unwrap();
        }
        prop_assert_eq!(allocator.free_list(), before);
    }

    #[test]
    fn releasing_everything_restores_the_arena(ops in ops()) {
        let mut allocator = Allocator::initialize(ARENA_SIZE).unwrap();
        let live = apply(&mut allocator, &ops);

        for handle in live {
            allocator.release(handle).unwrap();
        }
        prop_assert_eq!(allocator.free_list(), vec![Segment::new(0, ARENA_SIZE)]);
    }
}
