//! Device-grid backend: data-parallel blocks of lanes
//!
//! Models the massively-parallel execution target: the domain is rounded up
//! into fixed-size blocks ([`LaunchConfig::linear`]), every block is a
//! concurrent unit, and lanes inside a block execute with no ordering
//! guarantee relative to anything else in the grid. Lanes whose global index
//! falls beyond the domain are masked off before the kernel observes them.
//!
//! Blocks are executed on the shared work-stealing pool, which stands in for
//! grid hardware while preserving its contract: kernels are fixed-layout
//! values ([`Kernel`](crate::backend::Kernel): `Copy + Send + Sync`), must
//! not block or allocate, and cannot assume visibility of writes from other
//! lanes unless index sets are disjoint.

use std::sync::atomic::{AtomicU64, Ordering};

use fanout_tracing::perf_span;
use rayon::prelude::*;
use tracing::debug;

use crate::backend::traits::{Backend, BackendTag, Kernel};
use crate::backend::types::{BlockContext, Dispatch, LaunchConfig};
use crate::error::Result;
use crate::partition::TaskPartitioner;

/// Data-parallel grid execution backend
///
/// # Example
///
/// ```rust
/// use fanout_backends::{Backend, DeviceGridBackend, Dispatch};
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let backend = DeviceGridBackend::new();
/// let opts = Dispatch::default().with_block_size(128);
/// let hits = AtomicU64::new(0);
/// backend.submit(1000, &opts, |_i| {
///     hits.fetch_add(1, Ordering::Relaxed);
/// })?;
/// assert_eq!(hits.load(Ordering::Relaxed), 1000);
/// # Ok::<(), fanout_backends::BackendError>(())
/// ```
#[derive(Debug, Default)]
pub struct DeviceGridBackend {
    dispatched: AtomicU64,
}

impl DeviceGridBackend {
    /// Create a device-grid backend
    pub fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
        }
    }
}

impl Backend for DeviceGridBackend {
    fn tag(&self) -> BackendTag {
        BackendTag::DeviceGrid
    }

    fn thread_count(&self) -> usize {
        rayon::current_num_threads()
    }

    fn submit<K: Kernel>(&self, domain: usize, opts: &Dispatch, kernel: K) -> Result<()> {
        opts.validate()?;
        if domain == 0 {
            return Ok(());
        }
        let launch = LaunchConfig::linear(domain, opts.block_size)?;
        self.dispatched.fetch_add(launch.num_blocks, Ordering::Relaxed);
        debug!(%launch, domain, "launching grid");
        let _span = perf_span!("grid_launch");

        (0..launch.num_blocks).into_par_iter().for_each(|block_idx| {
            for lane_idx in 0..launch.block_size {
                let ctx = BlockContext::new(block_idx, lane_idx, launch);
                let global = ctx.global_index();
                // Overhang lanes of the last block are masked off
                if (global as usize) < domain {
                    kernel(global as usize);
                }
            }
        });
        Ok(())
    }

    fn unit_partition(&self, n: usize, opts: &Dispatch) -> Result<TaskPartitioner> {
        opts.validate()?;
        let num_blocks = n.div_ceil(opts.block_size as usize);
        TaskPartitioner::new(n, num_blocks.max(1), 1)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU8;

    #[test]
    fn each_index_invoked_exactly_once() {
        let backend = DeviceGridBackend::new();
        for domain in [0usize, 1, 255, 256, 257, 1000, 4096] {
            for block_size in [1u32, 32, 256] {
                let opts = Dispatch::default().with_block_size(block_size);
                let counts: Vec<AtomicU8> = (0..domain).map(|_| AtomicU8::new(0)).collect();
                let counts_ref = &counts;
                backend
                    .submit(domain, &opts, |i| {
                        counts_ref[i].fetch_add(1, Ordering::Relaxed);
                    })
                    .unwrap();
                assert!(
                    counts.iter().all(|c| c.load(Ordering::Relaxed) == 1),
                    "domain={domain} block_size={block_size}"
                );
            }
        }
    }

    #[test]
    fn dispatch_counter_tracks_blocks() {
        let backend = DeviceGridBackend::new();
        let opts = Dispatch::default().with_block_size(256);
        backend.submit(1000, &opts, |_| {}).unwrap();
        // ceil(1000 / 256) = 4 blocks
        assert_eq!(backend.dispatched_units(), 4);
        backend.reset_dispatch_stats();
        assert_eq!(backend.dispatched_units(), 0);
    }

    #[test]
    fn unit_partition_follows_block_size() {
        let backend = DeviceGridBackend::new();
        let opts = Dispatch::default().with_block_size(256);
        let units = backend.unit_partition(1000, &opts).unwrap();
        assert_eq!(units.num_tasks(), 4);
        assert_eq!(units.ranges().map(|r| r.len()).sum::<usize>(), 1000);

        let empty = backend.unit_partition(0, &opts).unwrap();
        assert_eq!(empty.num_tasks(), 0);
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let backend = DeviceGridBackend::new();
        let opts = Dispatch::default().with_block_size(0);
        assert!(backend.submit(100, &opts, |_| {}).is_err());
    }
}
