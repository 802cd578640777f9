//! Parallel binary search over sorted sequences
//!
//! Each query is an independent binary search with no cross-task state, so
//! batches dispatch straight through the parallel-for layer: one unit of
//! work per query, disjoint writes into the output by query index.

use std::cmp::Ordering;

use fanout_backends::{Backend, Dispatch};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::sync_slice::SyncSlice;

/// Which insertion point to return for runs of equal elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Leftmost insertion index keeping the sequence sorted
    #[default]
    Left,
    /// Rightmost insertion index keeping the sequence sorted
    Right,
}

/// First index at which `target` could be inserted into sorted `data`
/// without breaking the order given by `cmp`.
pub fn lower_bound_by<T, C>(data: &[T], target: &T, cmp: C) -> usize
where
    C: Fn(&T, &T) -> Ordering,
{
    let mut lo = 0;
    let mut hi = data.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(&data[mid], target) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// One past the last index at which `target` could be inserted into sorted
/// `data` without breaking the order given by `cmp`.
pub fn upper_bound_by<T, C>(data: &[T], target: &T, cmp: C) -> usize
where
    C: Fn(&T, &T) -> Ordering,
{
    let mut lo = 0;
    let mut hi = data.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(&data[mid], target) == Ordering::Greater {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// [`lower_bound_by`] with the natural order
pub fn lower_bound<T: Ord>(data: &[T], target: &T) -> usize {
    lower_bound_by(data, target, T::cmp)
}

/// [`upper_bound_by`] with the natural order
pub fn upper_bound<T: Ord>(data: &[T], target: &T) -> usize {
    upper_bound_by(data, target, T::cmp)
}

/// For every query, the insertion index into sorted `haystack` that keeps
/// the sequence sorted; one independent binary search per query.
///
/// # Errors
///
/// Fails with [`Error::LengthMismatch`] if `out.len() != queries.len()`.
///
/// # Example
///
/// ```rust
/// use fanout_core::{ops, ops::search::Side, Dispatch, ThreadPoolBackend};
///
/// let backend = ThreadPoolBackend::new();
/// let haystack = vec![1, 3, 3, 5, 9];
/// let queries = vec![0, 3, 6, 10];
/// let mut out = vec![0usize; queries.len()];
/// ops::search::search_sorted(&backend, &haystack, &queries, &mut out, Side::Left, &Dispatch::default())?;
/// assert_eq!(out, vec![0, 1, 3, 5]);
/// # Ok::<(), fanout_core::Error>(())
/// ```
pub fn search_sorted<T, B>(
    backend: &B,
    haystack: &[T],
    queries: &[T],
    out: &mut [usize],
    side: Side,
    opts: &Dispatch,
) -> Result<()>
where
    B: Backend,
    T: Ord + Sync,
{
    search_sorted_by(backend, haystack, queries, out, T::cmp, side, opts)
}

/// [`search_sorted`] with a caller-supplied comparator. `haystack` must be
/// sorted consistently with `cmp`.
#[instrument(skip_all, fields(haystack = haystack.len(), queries = queries.len(), side = ?side, backend = %backend.tag()))]
pub fn search_sorted_by<T, B, C>(
    backend: &B,
    haystack: &[T],
    queries: &[T],
    out: &mut [usize],
    cmp: C,
    side: Side,
    opts: &Dispatch,
) -> Result<()>
where
    B: Backend,
    T: Sync,
    C: Fn(&T, &T) -> Ordering + Copy + Send + Sync,
{
    if out.len() != queries.len() {
        return Err(Error::length_mismatch("out", queries.len(), out.len()));
    }

    let out_shared = SyncSlice::new(out);
    backend.submit(queries.len(), opts, |q| {
        let idx = match side {
            Side::Left => lower_bound_by(haystack, &queries[q], cmp),
            Side::Right => upper_bound_by(haystack, &queries[q], cmp),
        };
        // SAFETY: each query index is visited exactly once
        unsafe { out_shared.write(q, idx) };
    })?;
    Ok(())
}

// ================================================================================================
// Tests
// ================================================================================================
