//! Map-reduce over partitioned domains
//!
//! Reductions run in two phases. Phase one folds each concurrent unit's
//! contiguous range into a partial result, seeded with the `neutral`
//! element. Phase two merges the partials sequentially, in unit order,
//! seeded with `init`. The sequential merge costs `num_units` combine
//! steps, negligible next to phase one, and makes the combine order
//! deterministic: repeated calls with the same `max_tasks` produce
//! bit-identical results even for floating-point operators.
//!
//! The reduce operator must be associative; commutativity is not required.

use fanout_backends::{Backend, Dispatch};
use num_traits::{One, Zero};
use tracing::instrument;

use crate::error::Result;
use crate::sync_slice::SyncSlice;

/// Apply `map` to every element and fold the results with `reduce`.
///
/// Each unit's local fold is seeded with `neutral` (which must be an
/// identity of `reduce`); the final merge across units is seeded with
/// `init`, applied exactly once. An empty input returns `init` unchanged.
///
/// # Example
///
/// ```rust
/// use fanout_core::{ops, Dispatch, ThreadPoolBackend};
///
/// let backend = ThreadPoolBackend::new();
/// let data: Vec<u64> = (1..=100).collect();
/// let sum_of_squares = ops::reduce::map_reduce(
///     &backend,
///     &data,
///     |&x| x * x,
///     |a, b| a + b,
///     0,
///     0,
///     &Dispatch::default(),
/// )?;
/// assert_eq!(sum_of_squares, 338_350);
/// # Ok::<(), fanout_core::Error>(())
/// ```
#[instrument(skip_all, fields(n = input.len(), backend = %backend.tag()))]
pub fn map_reduce<T, A, B, M, R>(
    backend: &B,
    input: &[T],
    map: M,
    reduce: R,
    init: A,
    neutral: A,
    opts: &Dispatch,
) -> Result<A>
where
    B: Backend,
    T: Sync,
    A: Copy + Send + Sync,
    M: Fn(&T) -> A + Copy + Send + Sync,
    R: Fn(A, A) -> A + Copy + Send + Sync,
{
    if input.is_empty() {
        return Ok(init);
    }

    let units = backend.unit_partition(input.len(), opts)?;
    let num_units = units.num_tasks();

    // Phase 1: one local fold per unit
    let mut partials = vec![neutral; num_units];
    {
        let partials_out = SyncSlice::new(&mut partials);
        let units_ref = &units;
        backend.submit(num_units, &opts.unit_level(), |u| {
            let mut acc = neutral;
            for i in units_ref.task_range(u) {
                acc = reduce(acc, map(&input[i]));
            }
            // SAFETY: unit `u` is the only writer of partials[u]
            unsafe { partials_out.write(u, acc) };
        })?;
    }

    // Phase 2: sequential merge in unit order, init applied once
    let mut result = init;
    for partial in partials {
        result = reduce(result, partial);
    }
    Ok(result)
}

/// Fold all elements with `reduce`. Identity map over [`map_reduce`].
pub fn reduce<T, B, R>(
    backend: &B,
    input: &[T],
    reduce_fn: R,
    init: T,
    neutral: T,
    opts: &Dispatch,
) -> Result<T>
where
    B: Backend,
    T: Copy + Send + Sync,
    R: Fn(T, T) -> T + Copy + Send + Sync,
{
    map_reduce(backend, input, |x| *x, reduce_fn, init, neutral, opts)
}

/// Sum of all elements; zero for an empty input.
pub fn sum<T, B>(backend: &B, input: &[T], opts: &Dispatch) -> Result<T>
where
    B: Backend,
    T: Copy + Send + Sync + Zero,
{
    map_reduce(backend, input, |x| *x, |a, b| a + b, T::zero(), T::zero(), opts)
}

/// Product of all elements; one for an empty input.
pub fn product<T, B>(backend: &B, input: &[T], opts: &Dispatch) -> Result<T>
where
    B: Backend,
    T: Copy + Send + Sync + One,
{
    map_reduce(backend, input, |x| *x, |a, b| a * b, T::one(), T::one(), opts)
}

/// Smallest element, or `None` for an empty input.
pub fn min_value<T, B>(backend: &B, input: &[T], opts: &Dispatch) -> Result<Option<T>>
where
    B: Backend,
    T: Copy + Send + Sync + PartialOrd,
{
    map_reduce(
        backend,
        input,
        |x| Some(*x),
        |a, b| match (a, b) {
            (Some(x), Some(y)) => Some(if y < x { y } else { x }),
            (Some(x), None) => Some(x),
            (None, y) => y,
        },
        None,
        None,
        opts,
    )
}

/// Largest element, or `None` for an empty input.
pub fn max_value<T, B>(backend: &B, input: &[T], opts: &Dispatch) -> Result<Option<T>>
where
    B: Backend,
    T: Copy + Send + Sync + PartialOrd,
{
    map_reduce(
        backend,
        input,
        |x| Some(*x),
        |a, b| match (a, b) {
            (Some(x), Some(y)) => Some(if y > x { y } else { x }),
            (Some(x), None) => Some(x),
            (None, y) => y,
        },
        None,
        None,
        opts,
    )
}

/// Number of elements satisfying `pred`.
pub fn count<T, B, P>(backend: &B, input: &[T], pred: P, opts: &Dispatch) -> Result<usize>
where
    B: Backend,
    T: Sync,
    P: Fn(&T) -> bool + Copy + Send + Sync,
{
    map_reduce(backend, input, |x| usize::from(pred(x)), |a, b| a + b, 0, 0, opts)
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_backends::{DeviceGridBackend, ThreadPoolBackend};

    #[test]
    fn sum_matches_sequential() {
        let cpu = ThreadPoolBackend::new();
        let grid = DeviceGridBackend::new();
        for n in [0usize, 1, 7, 1000, 4097] {
            let data: Vec<u64> = (0..n as u64).collect();
            let expected: u64 = data.iter().sum();
            for max_tasks in [1usize, 4, 13] {
                let opts = Dispatch::default().with_max_tasks(max_tasks);
                assert_eq!(sum(&cpu, &data, &opts).unwrap(), expected);
            }
            let opts = Dispatch::default().with_block_size(64);
            assert_eq!(sum(&grid, &data, &opts).unwrap(), expected);
        }
    }

    #[test]
    fn empty_input_returns_init() {
        let backend = ThreadPoolBackend::new();
        let data: Vec<i64> = Vec::new();
        let r = map_reduce(&backend, &data, |&x| x, |a, b| a + b, 42, 0, &Dispatch::default()).unwrap();
        assert_eq!(r, 42);
    }

    #[test]
    fn init_is_applied_once() {
        let backend = ThreadPoolBackend::new();
        let data = vec![1i64; 100];
        let opts = Dispatch::default().with_max_tasks(8);
        let r = map_reduce(&backend, &data, |&x| x, |a, b| a + b, 1000, 0, &opts).unwrap();
        assert_eq!(r, 1100);
    }

    #[test]
    fn non_commutative_operator_merges_in_order() {
        // Affine transform composition: (a, b) . (c, d) = (a*c, a*d + b).
        // Associative but not commutative, so the result is only correct if
        // partials merge left to right in unit order.
        let compose = |x: (i64, i64), y: (i64, i64)| (x.0 * y.0, x.0 * y.1 + x.1);
        let id = (1i64, 0i64);

        let data: Vec<(i64, i64)> = (1..=40).map(|i| (i % 3 + 1, i % 7 - 3)).collect();
        let expected = data.iter().fold(id, |acc, &x| compose(acc, x));

        let cpu = ThreadPoolBackend::new();
        let grid = DeviceGridBackend::new();
        for max_tasks in [1usize, 3, 8] {
            let opts = Dispatch::default().with_max_tasks(max_tasks);
            let r = map_reduce(&cpu, &data, |&x| x, compose, id, id, &opts).unwrap();
            assert_eq!(r, expected, "max_tasks={max_tasks}");
        }
        let opts = Dispatch::default().with_block_size(8);
        let r = map_reduce(&grid, &data, |&x| x, compose, id, id, &opts).unwrap();
        assert_eq!(r, expected);
    }

    #[test]
    fn float_reduction_is_repeatable() {
        let backend = ThreadPoolBackend::new();
        let data: Vec<f64> = (0..10_000).map(|i| (i as f64) * 0.1 + 0.007).collect();
        let opts = Dispatch::default().with_max_tasks(7);
        let first = sum(&backend, &data, &opts).unwrap();
        for _ in 0..10 {
            let again = sum(&backend, &data, &opts).unwrap();
            assert_eq!(first.to_bits(), again.to_bits());
        }
    }

    #[test]
    fn min_max_and_count() {
        let backend = ThreadPoolBackend::new();
        let data = vec![5i32, -3, 17, 0, 9, -3, 12];
        let opts = Dispatch::default().with_max_tasks(3);
        assert_eq!(min_value(&backend, &data, &opts).unwrap(), Some(-3));
        assert_eq!(max_value(&backend, &data, &opts).unwrap(), Some(17));
        assert_eq!(count(&backend, &data, |&x| x < 0, &opts).unwrap(), 2);

        let empty: Vec<i32> = Vec::new();
        assert_eq!(min_value(&backend, &empty, &opts).unwrap(), None);
        assert_eq!(product(&backend, &empty, &opts).unwrap(), 1);
    }
}
