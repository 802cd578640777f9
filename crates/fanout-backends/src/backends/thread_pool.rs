//! CPU backend: bounded pool of tasks over contiguous ranges
//!
//! The thread-pool backend cuts an index domain with a [`TaskPartitioner`]
//! and runs one task per range. Two schedulers are available:
//!
//! - [`Scheduler::Threads`] spawns one scoped OS thread per task. Thread
//!   launch costs microseconds, so this pays off for coarse work.
//! - [`Scheduler::Pool`] runs tasks on the shared work-stealing pool, which
//!   keeps dispatch overhead in the sub-microsecond range.
//!
//! When the partitioner resolves to a single task the range is executed
//! inline on the calling thread and nothing is dispatched. This is a
//! required fast path: small domains must not pay thread-launch overhead,
//! and tests observe it through [`Backend::dispatched_units`].

use std::sync::atomic::{AtomicU64, Ordering};

use fanout_tracing::perf_span;
use tracing::debug;

use crate::backend::traits::{Backend, BackendTag, Kernel};
use crate::backend::types::{Dispatch, Scheduler};
use crate::error::Result;
use crate::partition::TaskPartitioner;

/// CPU execution backend over a bounded task pool
///
/// # Example
///
/// ```rust
/// use fanout_backends::{Backend, Dispatch, ThreadPoolBackend};
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let backend = ThreadPoolBackend::new();
/// let hits = AtomicU64::new(0);
/// backend.submit(1000, &Dispatch::default(), |_i| {
///     hits.fetch_add(1, Ordering::Relaxed);
/// })?;
/// assert_eq!(hits.load(Ordering::Relaxed), 1000);
/// # Ok::<(), fanout_backends::BackendError>(())
/// ```
#[derive(Debug)]
pub struct ThreadPoolBackend {
    threads: usize,
    dispatched: AtomicU64,
}

impl ThreadPoolBackend {
    /// Create a backend sized to the process-wide worker count
    pub fn new() -> Self {
        Self::with_threads(num_cpus::get())
    }

    /// Create a backend reporting `threads` workers.
    ///
    /// The value only seeds defaults and diagnostics; the per-call
    /// `max_tasks` option remains the hard ceiling on concurrency.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Run `f` once per task of `tp`, concurrently under `scheduler`.
    ///
    /// `f` receives the task ordinal and its contiguous range. A partition
    /// with a single task runs inline on the calling thread.
    pub fn run_tasks<F>(&self, tp: &TaskPartitioner, scheduler: Scheduler, f: F)
    where
        F: Fn(usize, std::ops::Range<usize>) + Copy + Send + Sync,
    {
        let num_tasks = tp.num_tasks();
        if num_tasks == 0 {
            return;
        }
        if num_tasks == 1 {
            debug!(num_elems = tp.num_elems(), "single task, executing inline");
            f(0, tp.task_range(0));
            return;
        }

        self.dispatched.fetch_add(num_tasks as u64, Ordering::Relaxed);
        debug!(
            num_tasks,
            num_elems = tp.num_elems(),
            %scheduler,
            "dispatching tasks"
        );
        let _span = perf_span!("cpu_dispatch");

        match scheduler {
            Scheduler::Threads => {
                std::thread::scope(|s| {
                    for (i, range) in tp.ranges().enumerate() {
                        s.spawn(move || f(i, range));
                    }
                });
            }
            Scheduler::Pool => {
                rayon::scope(|s| {
                    for (i, range) in tp.ranges().enumerate() {
                        s.spawn(move |_| f(i, range));
                    }
                });
            }
        }
    }
}

impl Default for ThreadPoolBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ThreadPoolBackend {
    fn tag(&self) -> BackendTag {
        BackendTag::Cpu
    }

    fn thread_count(&self) -> usize {
        self.threads
    }

    fn submit<K: Kernel>(&self, domain: usize, opts: &Dispatch, kernel: K) -> Result<()> {
        opts.validate()?;
        if domain == 0 {
            return Ok(());
        }
        let tp = TaskPartitioner::new(domain, opts.max_tasks, opts.min_elems)?;
        self.run_tasks(&tp, opts.scheduler, |_task, range| {
            for i in range {
                kernel(i);
            }
        });
        Ok(())
    }

    fn unit_partition(&self, n: usize, opts: &Dispatch) -> Result<TaskPartitioner> {
        TaskPartitioner::new(n, opts.max_tasks, opts.min_elems)
    }

    fn dispatched_units(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    fn reset_dispatch_stats(&self) {
        self.dispatched.store(0, Ordering::Relaxed);
    }
}

// ================================================================================================
// Tests
// ================================================================================================
