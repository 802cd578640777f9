//! Balanced task partitioning for contiguous index domains
//!
//! A [`TaskPartitioner`] divides `num_elems` elements over at most `max_tasks`
//! tasks with at least `min_elems` elements per task. The resulting ranges are
//! contiguous, non-overlapping and gap-free, and their lengths differ by at
//! most one, so every concurrent unit receives an equal share of work.
//!
//! Partitioners are cheap to build, immutable once constructed, and hold no
//! references to the data being partitioned. Both the thread-pool and the
//! device-grid backends derive their unit geometry from this type.

use crate::error::{BackendError, Result};

/// Balanced division of `num_elems` elements into at most `max_tasks`
/// contiguous ranges of at least `min_elems` elements each.
///
/// The number of tasks actually used is
/// `min(max_tasks, max(1, num_elems / min_elems))`, or zero for an empty
/// domain. The remainder of `num_elems` over the task count is distributed by
/// giving the first `num_elems % num_tasks` tasks one extra element.
///
/// # Examples
///
/// ```rust
/// use fanout_backends::TaskPartitioner;
///
/// // Divide 10 elements between 4 tasks
/// let tp = TaskPartitioner::new(10, 4, 1)?;
/// let ranges: Vec<_> = tp.ranges().collect();
/// assert_eq!(ranges, vec![0..3, 3..6, 6..8, 8..10]);
///
/// // Divide 20 elements between 6 tasks with at least 5 elements per task;
/// // only 4 of the 6 task slots are used
/// let tp = TaskPartitioner::new(20, 6, 5)?;
/// assert_eq!(tp.num_tasks(), 4);
/// assert_eq!(tp.task_range(3), 15..20);
/// # Ok::<(), fanout_backends::BackendError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPartitioner {
    num_elems: usize,
    max_tasks: usize,
    min_elems: usize,
    num_tasks: usize,
    /// `num_tasks + 1` start offsets; task `i` covers `starts[i]..starts[i+1]`
    task_starts: Vec<usize>,
}

impl TaskPartitioner {
    /// Create a partitioner for `num_elems` elements over at most `max_tasks`
    /// tasks with at least `min_elems` elements per task.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidConfig`] if `max_tasks` or `min_elems`
    /// is zero. An empty domain is valid and yields zero tasks.
    pub fn new(num_elems: usize, max_tasks: usize, min_elems: usize) -> Result<Self> {
        if max_tasks == 0 {
            return Err(BackendError::invalid_config("max_tasks must be >= 1"));
        }
        if min_elems == 0 {
            return Err(BackendError::invalid_config("min_elems must be >= 1"));
        }

        let num_tasks = if num_elems == 0 {
            0
        } else {
            max_tasks.min((num_elems / min_elems).max(1))
        };

        let mut task_starts = Vec::with_capacity(num_tasks + 1);
        if num_tasks > 0 {
            let chunk = num_elems / num_tasks;
            let remainder = num_elems % num_tasks;
            let mut start = 0;
            task_starts.push(start);
            for i in 0..num_tasks {
                start += chunk + usize::from(i < remainder);
                task_starts.push(start);
            }
            debug_assert_eq!(start, num_elems);
        }

        Ok(Self {
            num_elems,
            max_tasks,
            min_elems,
            num_tasks,
            task_starts,
        })
    }

    /// Number of elements in the partitioned domain
    pub fn num_elems(&self) -> usize {
        self.num_elems
    }

    /// Maximum number of tasks the partition was allowed to use
    pub fn max_tasks(&self) -> usize {
        self.max_tasks
    }

    /// Minimum number of elements per task
    pub fn min_elems(&self) -> usize {
        self.min_elems
    }

    /// Number of tasks actually used (`<= max_tasks`)
    pub fn num_tasks(&self) -> usize {
        self.num_tasks
    }

    /// True when the domain is empty and no tasks are used
    pub fn is_empty(&self) -> bool {
        self.num_tasks == 0
    }

    /// The contiguous index range assigned to task `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= num_tasks()`. Requesting a range outside the partition
    /// is a programming error, not a recoverable condition.
    pub fn task_range(&self, i: usize) -> std::ops::Range<usize> {
        assert!(
            i < self.num_tasks,
            "task index out of bounds: {} >= {}",
            i,
            self.num_tasks
        );
        self.task_starts[i]..self.task_starts[i + 1]
    }

    /// Iterator over all task ranges in task order
    pub fn ranges(&self) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
        (0..self.num_tasks).map(move |i| self.task_range(i))
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_elements_four_tasks() {
        let tp = TaskPartitioner::new(10, 4, 1).unwrap();
        assert_eq!(tp.num_tasks(), 4);
        let ranges: Vec<_> = tp.ranges().collect();
        assert_eq!(ranges, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn min_elems_limits_task_count() {
        // 20 / 5 = 4 tasks used out of 6 slots
        let tp = TaskPartitioner::new(20, 6, 5).unwrap();
        assert_eq!(tp.num_tasks(), 4);
        let ranges: Vec<_> = tp.ranges().collect();
        assert_eq!(ranges, vec![0..5, 5..10, 10..15, 15..20]);
    }

    #[test]
    fn empty_domain_has_no_tasks() {
        let tp = TaskPartitioner::new(0, 8, 1).unwrap();
        assert_eq!(tp.num_tasks(), 0);
        assert!(tp.is_empty());
        assert_eq!(tp.ranges().count(), 0);
    }

    #[test]
    fn tiny_domain_is_one_task() {
        // Fewer elements than min_elems still yields exactly one range
        let tp = TaskPartitioner::new(3, 8, 100).unwrap();
        assert_eq!(tp.num_tasks(), 1);
        assert_eq!(tp.task_range(0), 0..3);
    }

    #[test]
    fn rejects_zero_parameters() {
        assert!(TaskPartitioner::new(10, 0, 1).is_err());
        assert!(TaskPartitioner::new(10, 4, 0).is_err());
    }

    #[test]
    #[should_panic(expected = "task index out of bounds")]
    fn out_of_bounds_task_panics() {
        let tp = TaskPartitioner::new(10, 4, 1).unwrap();
        let _ = tp.task_range(4);
    }

    #[test]
    fn coverage_no_gaps_no_overlaps() {
        for num_elems in [0usize, 1, 2, 7, 10, 63, 64, 65, 1000, 1023] {
            for max_tasks in [1usize, 2, 3, 8, 16] {
                for min_elems in [1usize, 4, 100] {
                    let tp = TaskPartitioner::new(num_elems, max_tasks, min_elems).unwrap();
                    assert!(tp.num_tasks() <= max_tasks);

                    let mut covered = 0;
                    let mut prev_end = 0;
                    for (i, range) in tp.ranges().enumerate() {
                        assert_eq!(range.start, prev_end, "gap or overlap at task {i}");
                        assert!(!range.is_empty(), "empty range at task {i}");
                        covered += range.len();
                        prev_end = range.end;
                    }
                    assert_eq!(covered, num_elems);

                    // Every range holds at least min_elems, unless the whole
                    // domain is smaller than min_elems
                    if num_elems >= min_elems {
                        for range in tp.ranges() {
                            assert!(range.len() >= min_elems);
                        }
                    } else if num_elems > 0 {
                        assert_eq!(tp.num_tasks(), 1);
                    }
                }
            }
        }
    }

    #[test]
    fn range_lengths_differ_by_at_most_one() {
        let tp = TaskPartitioner::new(1003, 16, 1).unwrap();
        let lens: Vec<_> = tp.ranges().map(|r| r.len()).collect();
        let min = lens.iter().min().unwrap();
        let max = lens.iter().max().unwrap();
        assert!(max - min <= 1);
        // Longer ranges come first
        let mut sorted = lens.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(lens, sorted);
    }
}
