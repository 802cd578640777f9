//! Parallel for-loop dispatch
//!
//! [`for_each_index`] is the generic parallel-for every other primitive in
//! this crate is built on: one kernel invocation per index of a domain,
//! fanned out to whichever backend the caller selected. The backend decides
//! the concurrency shape (tasks over ranges on the CPU, blocks of lanes on a
//! device grid); the guarantee is identical everywhere: exactly once per
//! index, no ordering across concurrent units.
//!
//! [`task_partition`] is the CPU-only range-level form for callers that want
//! the whole contiguous range per task instead of per-index invocations.

use fanout_backends::{Backend, Dispatch, Kernel, TaskPartitioner, ThreadPoolBackend};
use tracing::instrument;

use crate::error::Result;

/// Invoke `f` once for every index in `[0, domain)` on `backend`.
///
/// Invocation order is ascending within a CPU task's range and unspecified
/// everywhere else. Two invocations may not assume visibility of each
/// other's writes unless their index sets are disjoint; disjointness per
/// concurrent unit is guaranteed by construction.
///
/// On the CPU a domain that resolves to a single task runs inline on the
/// calling thread; no concurrent unit is dispatched.
///
/// # Example
///
/// ```rust
/// use fanout_core::{for_each_index, Dispatch, ThreadPoolBackend};
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let backend = ThreadPoolBackend::new();
/// let marks: Vec<AtomicU64> = (0..100).map(|_| AtomicU64::new(0)).collect();
/// let marks_ref = &marks;
/// for_each_index(&backend, 100, &Dispatch::default(), |i| {
///     marks_ref[i].store(i as u64 + 1, Ordering::Relaxed);
/// })?;
/// assert!(marks.iter().enumerate().all(|(i, m)| m.load(Ordering::Relaxed) == i as u64 + 1));
/// # Ok::<(), fanout_core::Error>(())
/// ```
#[instrument(skip(backend, opts, f), fields(backend = %backend.tag()))]
pub fn for_each_index<B, K>(backend: &B, domain: usize, opts: &Dispatch, f: K) -> Result<()>
where
    B: Backend,
    K: Kernel,
{
    backend.submit(domain, opts, f)?;
    Ok(())
}

/// Partition `num_elems` elements over at most `max_tasks` tasks with at
/// least `min_elems` elements per task, and run `f(task, range)` once per
/// task, concurrently.
///
/// Range-level counterpart of [`for_each_index`] for CPU workloads that
/// amortize per-task setup over a whole contiguous range. A partition that
/// resolves to a single task runs inline on the calling thread.
#[instrument(skip(backend, f))]
pub fn task_partition<F>(
    backend: &ThreadPoolBackend,
    num_elems: usize,
    max_tasks: usize,
    min_elems: usize,
    f: F,
) -> Result<()>
where
    F: Fn(usize, std::ops::Range<usize>) + Copy + Send + Sync,
{
    let tp = TaskPartitioner::new(num_elems, max_tasks, min_elems)?;
    backend.run_tasks(&tp, fanout_backends::Scheduler::default(), f);
    Ok(())
}
