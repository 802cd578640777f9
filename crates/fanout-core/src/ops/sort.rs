//! Parallel comparison sort
//!
//! Sorting runs in two stages. First every concurrent unit sorts its
//! contiguous chunk locally. Then sorted runs are merged pairwise over
//! `log2(units)` rounds, ping-ponging between the data and a scratch buffer
//! of equal length. Each pair merge is itself parallel: balanced split
//! points along merge-path diagonals divide the output into equally sized
//! segments, and every segment is an independent sequential merge of two
//! subranges with disjoint writes by construction.
//!
//! The contract is a total order consistent with the comparator; the order
//! of tied elements is unspecified.
//!
//! The scratch buffer is borrowed from the caller when supplied (`temp`),
//! and never resized; without one the engine allocates a buffer scoped to
//! the call.

use std::cmp::Ordering;
use std::ops::Range;

use fanout_backends::{Backend, Dispatch};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::sync_slice::SyncSlice;

/// Sort `data` in ascending natural order.
///
/// # Example
///
/// ```rust
/// use fanout_core::{ops, Dispatch, ThreadPoolBackend};
///
/// let backend = ThreadPoolBackend::new();
/// let mut data = vec![4u32, 2, 7, 1, 9, 3];
/// ops::sort::sort(&backend, &mut data, None, &Dispatch::default())?;
/// assert_eq!(data, vec![1, 2, 3, 4, 7, 9]);
/// # Ok::<(), fanout_core::Error>(())
/// ```
pub fn sort<T, B>(backend: &B, data: &mut [T], temp: Option<&mut Vec<T>>, opts: &Dispatch) -> Result<()>
where
    B: Backend,
    T: Ord + Copy + Send + Sync,
{
    sort_by(backend, data, T::cmp, temp, opts)
}

/// Sort `data` by a caller-supplied comparator.
///
/// `cmp` must define a total order. A `temp` buffer shorter than `data` is
/// rejected with [`Error::ScratchTooSmall`]; only its first `data.len()`
/// elements are used, and its contents on return are unspecified.
#[instrument(skip_all, fields(n = data.len(), backend = %backend.tag()))]
pub fn sort_by<T, B, C>(
    backend: &B,
    data: &mut [T],
    cmp: C,
    temp: Option<&mut Vec<T>>,
    opts: &Dispatch,
) -> Result<()>
where
    B: Backend,
    T: Copy + Send + Sync,
    C: Fn(&T, &T) -> Ordering + Copy + Send + Sync,
{
    let n = data.len();
    if n <= 1 {
        return Ok(());
    }

    let units = backend.unit_partition(n, opts)?;
    let num_units = units.num_tasks();
    if num_units <= 1 {
        data.sort_unstable_by(cmp);
        return Ok(());
    }

    // Stage 1: sort each unit's chunk locally
    let runs: Vec<Range<usize>> = units.ranges().collect();
    {
        let shared = SyncSlice::new(&mut *data);
        let runs_ref = &runs;
        backend.submit(num_units, &opts.unit_level(), |u| {
            // SAFETY: unit ranges are disjoint by construction
            let chunk = unsafe { shared.slice_mut(runs_ref[u].clone()) };
            chunk.sort_unstable_by(cmp);
        })?;
    }

    // Stage 2: pairwise merge rounds, ping-ponging with the scratch buffer
    let mut owned_scratch: Vec<T>;
    let scratch: &mut [T] = match temp {
        Some(t) => {
            if t.len() < n {
                return Err(Error::ScratchTooSmall {
                    required: n,
                    actual: t.len(),
                });
            }
            &mut t[..n]
        }
        None => {
            owned_scratch = data.to_vec();
            &mut owned_scratch[..]
        }
    };

    merge_runs(backend, data, scratch, runs, num_units, cmp, opts)
}

/// Fill `perm` with the permutation that sorts `keys`: after the call,
/// `keys[perm[0]] <= keys[perm[1]] <= ...`. Tie order is unspecified.
///
/// # Errors
///
/// Fails with [`Error::LengthMismatch`] if `perm.len() != keys.len()`.
pub fn sort_permutation<T, B>(
    backend: &B,
    keys: &[T],
    perm: &mut [usize],
    temp: Option<&mut Vec<usize>>,
    opts: &Dispatch,
) -> Result<()>
where
    B: Backend,
    T: Ord + Sync,
{
    if perm.len() != keys.len() {
        return Err(Error::length_mismatch("perm", keys.len(), perm.len()));
    }
    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }
    sort_by(backend, perm, |&a, &b| keys[a].cmp(&keys[b]), temp, opts)
}

/// One merge segment: diagonals `d0..d1` of the pair `(a, b)`, written to
/// the destination at `dst_base + d0`.
struct MergeSeg {
    a: Range<usize>,
    b: Range<usize>,
    dst_base: usize,
    d0: usize,
    d1: usize,
}

fn merge_runs<T, B, C>(
    backend: &B,
    data: &mut [T],
    scratch: &mut [T],
    mut runs: Vec<Range<usize>>,
    num_units: usize,
    cmp: C,
    opts: &Dispatch,
) -> Result<()>
where
    B: Backend,
    T: Copy + Send + Sync,
    C: Fn(&T, &T) -> Ordering + Copy + Send + Sync,
{
    let n = data.len();
    let data_shared = SyncSlice::new(&mut *data);
    let scratch_shared = SyncSlice::new(&mut *scratch);

    // Whether the current sorted runs live in `data` (vs. the scratch)
    let mut in_data = true;

    while runs.len() > 1 {
        let num_pairs = runs.len().div_ceil(2);
        let segs_per_pair = num_units.div_ceil(num_pairs).max(1);
        debug!(runs = runs.len(), segs_per_pair, "merge round");

        let mut segs: Vec<MergeSeg> = Vec::with_capacity(num_pairs * segs_per_pair);
        let mut next_runs = Vec::with_capacity(num_pairs);
        let mut r = 0;
        while r < runs.len() {
            if r + 1 < runs.len() {
                let a = runs[r].clone();
                let b = runs[r + 1].clone();
                let total = a.len() + b.len();
                let s = segs_per_pair.min(total);
                for j in 0..s {
                    segs.push(MergeSeg {
                        a: a.clone(),
                        b: b.clone(),
                        dst_base: a.start,
                        d0: total * j / s,
                        d1: total * (j + 1) / s,
                    });
                }
                next_runs.push(a.start..b.end);
                r += 2;
            } else {
                // Unpaired trailing run: carry it across to keep the
                // ping-pong buffers consistent (empty right-hand side)
                let a = runs[r].clone();
                segs.push(MergeSeg {
                    a: a.clone(),
                    b: a.end..a.end,
                    dst_base: a.start,
                    d0: 0,
                    d1: a.len(),
                });
                next_runs.push(a);
                r += 1;
            }
        }

        let (src, dst) = if in_data {
            (data_shared, scratch_shared)
        } else {
            (scratch_shared, data_shared)
        };
        let segs_ref = &segs;
        backend.submit(segs.len(), &opts.unit_level(), |s| {
            let seg = &segs_ref[s];
            // SAFETY: `src` and `dst` are distinct buffers this round; the
            // source runs are only read, and destination diagonal ranges are
            // disjoint across segments by construction
            let a = unsafe { src.slice(seg.a.clone()) };
            let b = unsafe { src.slice(seg.b.clone()) };
            let (i0, j0) = merge_path(a, b, seg.d0, cmp);
            let (i1, j1) = merge_path(a, b, seg.d1, cmp);
            let out = unsafe { dst.slice_mut(seg.dst_base + seg.d0..seg.dst_base + seg.d1) };
            merge_serial(&a[i0..i1], &b[j0..j1], out, cmp);
        })?;

        in_data = !in_data;
        runs = next_runs;
    }

    if !in_data {
        // Final sorted order ended in the scratch; move it home.
        // SAFETY: the dispatch above has completed, both wrappers are
        // exclusive again
        let src = unsafe { scratch_shared.slice(0..n) };
        let dst = unsafe { data_shared.slice_mut(0..n) };
        dst.copy_from_slice(src);
    }
    Ok(())
}

/// Split point of the merge of sorted `a` and `b` at diagonal `diag`:
/// returns `(i, j)` with `i + j == diag` such that the first `diag` merged
/// elements are exactly `a[..i]` and `b[..j]`.
fn merge_path<T, C>(a: &[T], b: &[T], diag: usize, cmp: C) -> (usize, usize)
where
    C: Fn(&T, &T) -> Ordering,
{
    let mut lo = diag.saturating_sub(b.len());
    let mut hi = diag.min(a.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(&a[mid], &b[diag - mid - 1]) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    (lo, diag - lo)
}

/// Sequential two-pointer merge of sorted `a` and `b` into `dst`.
/// `dst.len()` must equal `a.len() + b.len()`.
fn merge_serial<T, C>(a: &[T], b: &[T], dst: &mut [T], cmp: C)
where
    T: Copy,
    C: Fn(&T, &T) -> Ordering,
{
    debug_assert_eq!(dst.len(), a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    for out in dst.iter_mut() {
        if i < a.len() && (j >= b.len() || cmp(&a[i], &b[j]) != Ordering::Greater) {
            *out = a[i];
            i += 1;
        } else {
            *out = b[j];
            j += 1;
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
