//! Splitting the root move list across workers

use std::ops::Range;

/// Contiguous half-open slice `[start, end)` of the root move list
/// handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkAssignment {
    pub worker: usize,
    pub start: usize,
    pub end: usize,
}

impl WorkAssignment {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `move_count` root moves over `worker_count` workers.
///
/// Every worker gets `move_count / worker_count` moves and the first
/// `move_count % worker_count` workers get one more. Ranges are contiguous,
/// disjoint and cover `[0, move_count)` exactly once. A `worker_count` of 0
/// yields no assignments.
#[must_use]
pub fn partition(move_count: usize, worker_count: usize) -> Vec<WorkAssignment> {
    if worker_count == 0 {
        return Vec::new();
    }
    let base = move_count / worker_count;
    let extra = move_count % worker_count;

    let mut start = 0;
    (0..worker_count)
        .map(|worker| {
            let len = base + usize::from(worker < extra);
            let assignment = WorkAssignment {
                worker,
                start,
                end: start + len,
            };
            start += len;
            assignment
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_split() {
        let parts = partition(8, 4);
        let ranges: Vec<_> = parts.iter().map(WorkAssignment::range).collect();
        assert_eq!(ranges, vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_remainder_goes_to_lowest_workers() {
        let parts = partition(10, 4);
        let lens: Vec<_> = parts.iter().map(WorkAssignment::len).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
        assert_eq!(parts[1].range(), 3..6);
        assert_eq!(parts[3].range(), 8..10);
    }

    #[test]
    fn test_more_workers_than_moves() {
        let parts = partition(2, 5);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].range(), 0..1);
        assert_eq!(parts[1].range(), 1..2);
        assert!(parts[2..].iter().all(WorkAssignment::is_empty));
    }

    #[test]
    fn test_no_moves() {
        let parts = partition(0, 3);
        assert!(parts.iter().all(|p| p.is_empty() && p.start == 0));
    }

    #[test]
    fn test_no_workers() {
        assert!(partition(5, 0).is_empty());
    }

    proptest! {
        #[test]
        fn partition_covers_each_move_once(moves in 0usize..200, workers in 1usize..32) {
            let parts = partition(moves, workers);
            prop_assert_eq!(parts.len(), workers);

            let mut next = 0;
            for (i, part) in parts.iter().enumerate() {
                prop_assert_eq!(part.worker, i);
                prop_assert_eq!(part.start, next);
                next = part.end;
            }
            prop_assert_eq!(next, moves);

            let max = parts.iter().map(WorkAssignment::len).max().unwrap_or(0);
            let min = parts.iter().map(WorkAssignment::len).min().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn partition_is_pure(moves in 0usize..200, workers in 1usize..32) {
            prop_assert_eq!(partition(moves, workers), partition(moves, workers));
        }
    }
}
