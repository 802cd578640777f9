//! # fanout-core - Data-Parallel Primitives
//!
//! Parallel for-loops, reductions, prefix scans, sorting, binary search and
//! predicate evaluation that run unmodified over either a multi-threaded CPU
//! pool or a data-parallel device grid, selected by a runtime-pluggable
//! backend.
//!
//! ## Architecture
//!
//! ```text
//! fanout_core::ops (map_reduce, accumulate, sort, search_sorted, any/all)
//!   ↓ built on
//! fanout_core::for_each_index (one kernel invocation per index)
//!   ↓ delegates to
//! fanout_backends::Backend (ThreadPoolBackend, DeviceGridBackend)
//! ```
//!
//! Every algorithm partitions its domain into contiguous, disjoint ranges
//! (one per concurrent unit) and combines per-unit partial results in a
//! deterministic order. Whichever backend executes the work, the observable
//! results are the same.
//!
//! ## Key Principles
//!
//! 1. **One generic body per algorithm**: backends differ in dispatch shape,
//!    never in semantics
//! 2. **Partition-guaranteed disjointness**: concurrent units write disjoint
//!    index sets by construction, no locks in any hot path
//! 3. **Deterministic combination**: partial results merge in unit order, so
//!    repeated runs with the same knobs are bit-identical
//! 4. **Borrowed scratch**: callers may supply reusable temp buffers; the
//!    engines never resize caller memory
//!
//! ## Example
//!
//! ```rust
//! use fanout_core::{ops, Dispatch, ThreadPoolBackend};
//!
//! let backend = ThreadPoolBackend::new();
//! let opts = Dispatch::default();
//!
//! let mut data = vec![5u64, 3, 9, 1, 7, 8, 2, 4];
//! ops::sort::sort(&backend, &mut data, None, &opts)?;
//! assert_eq!(data, vec![1, 2, 3, 4, 5, 7, 8, 9]);
//!
//! let total = ops::reduce::sum(&backend, &data, &opts)?;
//! assert_eq!(total, 39);
//! # Ok::<(), fanout_core::Error>(())
//! ```

pub mod dispatch;
pub mod error;
pub mod ops;

mod sync_slice;

pub use dispatch::{for_each_index, task_partition};
pub use error::{Error, Result};

// Re-export the backend surface so most callers depend on one crate
pub use fanout_backends::{
    Backend, BackendTag, Dispatch, DeviceGridBackend, Kernel, LaunchConfig, Scheduler, TaskPartitioner,
    ThreadPoolBackend, DEFAULT_BLOCK_SIZE,
};
