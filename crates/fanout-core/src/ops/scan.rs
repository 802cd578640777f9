//! Prefix scans (accumulate) over partitioned domains
//!
//! Cross-unit dependencies cannot be resolved in one parallel sweep without
//! barriers that independent tasks and blocks do not have, so scans run in
//! three passes:
//!
//! 1. each unit computes a local inclusive scan of its contiguous range;
//! 2. a sequential exclusive prefix over the `num_units` unit totals
//!    (seeded with `init`) yields each unit's offset, at a cost of
//!    `num_units` combine steps;
//! 3. each unit folds its offset into every local value, converting to the
//!    exclusive form on the fly when requested.
//!
//! The result equals the sequential left-to-right fold for any associative
//! operator, independent of `max_tasks` and `block_size`.

use fanout_backends::{Backend, Dispatch};
use num_traits::{One, Zero};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::sync_slice::SyncSlice;

/// Which elements a scanned position includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanKind {
    /// `out[i]` folds elements up to and including `i`
    #[default]
    Inclusive,
    /// `out[i]` folds elements strictly before `i`
    Exclusive,
}

/// Prefix-scan `input` into `output` with `op`, seeded with `init`.
///
/// For [`ScanKind::Inclusive`], `out[i] = op(init, x[0] . x[1] . ... . x[i])`;
/// for [`ScanKind::Exclusive`], `out[i]` folds only the elements before `i`,
/// with `out[0] = init`. `op` must be associative and `init` is applied to
/// every position exactly once. Empty input is a no-op.
///
/// # Errors
///
/// Fails with [`Error::LengthMismatch`] if `output.len() != input.len()`.
///
/// # Example
///
/// ```rust
/// use fanout_core::{ops, ops::scan::ScanKind, Dispatch, ThreadPoolBackend};
///
/// let backend = ThreadPoolBackend::new();
/// let input = vec![1u64, 2, 3, 4, 5];
/// let mut output = vec![0u64; 5];
/// ops::scan::accumulate(
///     &backend,
///     &input,
///     &mut output,
///     |a, b| a + b,
///     0,
///     ScanKind::Inclusive,
///     &Dispatch::default(),
/// )?;
/// assert_eq!(output, vec![1, 3, 6, 10, 15]);
/// # Ok::<(), fanout_core::Error>(())
/// ```
#[instrument(skip_all, fields(n = input.len(), kind = ?kind, backend = %backend.tag()))]
pub fn accumulate<T, B, F>(
    backend: &B,
    input: &[T],
    output: &mut [T],
    op: F,
    init: T,
    kind: ScanKind,
    opts: &Dispatch,
) -> Result<()>
where
    B: Backend,
    T: Copy + Send + Sync,
    F: Fn(T, T) -> T + Copy + Send + Sync,
{
    if output.len() != input.len() {
        return Err(Error::length_mismatch("output", input.len(), output.len()));
    }
    output.copy_from_slice(input);
    accumulate_in_place(backend, output, op, init, kind, opts)
}

/// In-place form of [`accumulate`]: scans `data` over itself.
pub fn accumulate_in_place<T, B, F>(
    backend: &B,
    data: &mut [T],
    op: F,
    init: T,
    kind: ScanKind,
    opts: &Dispatch,
) -> Result<()>
where
    B: Backend,
    T: Copy + Send + Sync,
    F: Fn(T, T) -> T + Copy + Send + Sync,
{
    let n = data.len();
    if n == 0 {
        return Ok(());
    }

    let units = backend.unit_partition(n, opts)?;
    let num_units = units.num_tasks();

    if num_units <= 1 {
        scan_serial_in_place(data, op, init, kind);
        return Ok(());
    }

    // Pass 1: local inclusive scan per unit; the last element of each
    // scanned range is that unit's total
    {
        let shared = SyncSlice::new(&mut *data);
        let units_ref = &units;
        backend.submit(num_units, &opts.unit_level(), |u| {
            // SAFETY: unit ranges are disjoint by construction
            let chunk = unsafe { shared.slice_mut(units_ref.task_range(u)) };
            let mut acc = chunk[0];
            for x in chunk.iter_mut().skip(1) {
                acc = op(acc, *x);
                *x = acc;
            }
        })?;
    }

    // Pass 2: sequential exclusive prefix over unit totals, seeded with init
    let mut offsets = Vec::with_capacity(num_units);
    let mut running = init;
    for range in units.ranges() {
        offsets.push(running);
        running = op(running, data[range.end - 1]);
    }

    // Pass 3: fold each unit's offset into its local scan values
    {
        let shared = SyncSlice::new(&mut *data);
        let units_ref = &units;
        let offsets_ref = &offsets;
        backend.submit(num_units, &opts.unit_level(), |u| {
            let offset = offsets_ref[u];
            // SAFETY: unit ranges are disjoint by construction
            let chunk = unsafe { shared.slice_mut(units_ref.task_range(u)) };
            match kind {
                ScanKind::Inclusive => {
                    for x in chunk.iter_mut() {
                        *x = op(offset, *x);
                    }
                }
                ScanKind::Exclusive => {
                    // Shift right within the unit while applying the offset;
                    // walk backwards so each local value is read before it
                    // is overwritten
                    for i in (1..chunk.len()).rev() {
                        chunk[i] = op(offset, chunk[i - 1]);
                    }
                    chunk[0] = offset;
                }
            }
        })?;
    }

    Ok(())
}

/// Inclusive running sum; `out[i] = x[0] + ... + x[i]`.
pub fn cumsum<T, B>(backend: &B, input: &[T], output: &mut [T], opts: &Dispatch) -> Result<()>
where
    B: Backend,
    T: Copy + Send + Sync + Zero,
{
    accumulate(backend, input, output, |a, b| a + b, T::zero(), ScanKind::Inclusive, opts)
}

/// Inclusive running product; `out[i] = x[0] * ... * x[i]`.
pub fn cumprod<T, B>(backend: &B, input: &[T], output: &mut [T], opts: &Dispatch) -> Result<()>
where
    B: Backend,
    T: Copy + Send + Sync + One,
{
    accumulate(backend, input, output, |a, b| a * b, T::one(), ScanKind::Inclusive, opts)
}

fn scan_serial_in_place<T, F>(data: &mut [T], op: F, init: T, kind: ScanKind)
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    let mut acc = init;
    match kind {
        ScanKind::Inclusive => {
            for x in data.iter_mut() {
                acc = op(acc, *x);
                *x = acc;
            }
        }
        ScanKind::Exclusive => {
            for x in data.iter_mut() {
                let t = *x;
                *x = acc;
                acc = op(acc, t);
            }
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_backends::{DeviceGridBackend, ThreadPoolBackend};

    fn oracle<T: Copy, F: Fn(T, T) -> T>(input: &[T], op: F, init: T, kind: ScanKind) -> Vec<T> {
        let mut out = Vec::with_capacity(input.len());
        let mut acc = init;
        for &x in input {
            match kind {
                ScanKind::Inclusive => {
                    acc = op(acc, x);
                    out.push(acc);
                }
                ScanKind::Exclusive => {
                    out.push(acc);
                    acc = op(acc, x);
                }
            }
        }
        out
    }

    #[test]
    fn matches_sequential_fold_for_all_task_counts() {
        let cpu = ThreadPoolBackend::new();
        for n in [0usize, 1, 2, 17, 256, 1000] {
            let input: Vec<u64> = (0..n as u64).map(|i| i * 7 + 3).collect();
            for kind in [ScanKind::Inclusive, ScanKind::Exclusive] {
                let expected = oracle(&input, |a, b| a + b, 0, kind);
                for max_tasks in [1usize, 2, 5, 16] {
                    let opts = Dispatch::default().with_max_tasks(max_tasks);
                    let mut out = vec![0u64; n];
                    accumulate(&cpu, &input, &mut out, |a, b| a + b, 0, kind, &opts).unwrap();
                    assert_eq!(out, expected, "n={n} max_tasks={max_tasks} kind={kind:?}");
                }
            }
        }
    }

    #[test]
    fn matches_sequential_fold_on_device_grid() {
        let grid = DeviceGridBackend::new();
        let input: Vec<i64> = (0..1000).map(|i| i % 11 - 5).collect();
        let expected = oracle(&input, |a, b| a + b, 0, ScanKind::Inclusive);
        for block_size in [1u32, 32, 256] {
            let opts = Dispatch::default().with_block_size(block_size);
            let mut out = vec![0i64; input.len()];
            accumulate(&grid, &input, &mut out, |a, b| a + b, 0, ScanKind::Inclusive, &opts).unwrap();
            assert_eq!(out, expected, "block_size={block_size}");
        }
    }

    #[test]
    fn init_offsets_every_position() {
        let backend = ThreadPoolBackend::new();
        let input = vec![1u64, 1, 1, 1];
        let opts = Dispatch::default().with_max_tasks(2);

        let mut out = vec![0u64; 4];
        accumulate(&backend, &input, &mut out, |a, b| a + b, 100, ScanKind::Inclusive, &opts).unwrap();
        assert_eq!(out, vec![101, 102, 103, 104]);

        accumulate(&backend, &input, &mut out, |a, b| a + b, 100, ScanKind::Exclusive, &opts).unwrap();
        assert_eq!(out, vec![100, 101, 102, 103]);
    }

    #[test]
    fn in_place_scan() {
        let backend = ThreadPoolBackend::new();
        let mut data: Vec<u32> = (1..=100).collect();
        let expected = oracle(&data, |a, b| a + b, 0, ScanKind::Inclusive);
        let opts = Dispatch::default().with_max_tasks(4);
        accumulate_in_place(&backend, &mut data, |a, b| a + b, 0, ScanKind::Inclusive, &opts).unwrap();
        assert_eq!(data, expected);
    }

    #[test]
    fn non_commutative_operator_scans_in_order() {
        // String-free non-commutative fold: affine composition
        let compose = |x: (i64, i64), y: (i64, i64)| (x.0 * y.0, x.0 * y.1 + x.1);
        let id = (1i64, 0i64);
        let input: Vec<(i64, i64)> = (1..=64).map(|i| (i % 2 + 1, i % 5 - 2)).collect();
        let expected = oracle(&input, compose, id, ScanKind::Inclusive);

        let backend = ThreadPoolBackend::new();
        let opts = Dispatch::default().with_max_tasks(7);
        let mut out = vec![id; input.len()];
        accumulate(&backend, &input, &mut out, compose, id, ScanKind::Inclusive, &opts).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn cumsum_and_cumprod() {
        let backend = ThreadPoolBackend::new();
        let opts = Dispatch::default().with_max_tasks(3);

        let input = vec![1i64, 2, 3, 4, 5];
        let mut out = vec![0i64; 5];
        cumsum(&backend, &input, &mut out, &opts).unwrap();
        assert_eq!(out, vec![1, 3, 6, 10, 15]);

        cumprod(&backend, &input, &mut out, &opts).unwrap();
        assert_eq!(out, vec![1, 2, 6, 24, 120]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let backend = ThreadPoolBackend::new();
        let input = vec![1u32; 10];
        let mut out = vec![0u32; 9];
        let r = accumulate(
            &backend,
            &input,
            &mut out,
            |a, b| a + b,
            0,
            ScanKind::Inclusive,
            &Dispatch::default(),
        );
        assert!(r.is_err());
    }
}
