//! Execution backends for fanout
//!
//! This crate provides:
//! - **TaskPartitioner**: balanced division of an index domain into
//!   contiguous, gap-free ranges
//! - **Backend trait**: the dispatch capability the algorithm layer
//!   depends on
//! - **ThreadPoolBackend**: bounded CPU task pool with selectable
//!   schedulers (scoped OS threads or the shared work-stealing pool)
//! - **DeviceGridBackend**: data-parallel grid of fixed-size blocks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Algorithms (fanout-core)                   │
//! │     for_each_index / map_reduce / accumulate / ...      │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │ Backend::submit(domain, opts, kernel)
//!         ┌─────────────┴─────────────┐
//!         ▼                           ▼
//! ┌──────────────────┐       ┌──────────────────┐
//! │ ThreadPoolBackend│       │ DeviceGridBackend│
//! │ TaskPartitioner  │       │ LaunchConfig     │
//! │ ranges → tasks   │       │ blocks × lanes   │
//! └──────────────────┘       └──────────────────┘
//! ```
//!
//! Whichever backend is selected, a submitted kernel runs exactly once per
//! index of its domain. Partitioning guarantees disjoint index ranges per
//! concurrent unit; a kernel writing outside its own index is a caller
//! error.
//!
//! # Usage
//!
//! ```rust
//! use fanout_backends::{Backend, Dispatch, ThreadPoolBackend};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let backend = ThreadPoolBackend::new();
//! let opts = Dispatch::default().with_max_tasks(4).with_min_elems(100);
//!
//! let sum = AtomicU64::new(0);
//! backend.submit(10_000, &opts, |i| {
//!     sum.fetch_add(i as u64, Ordering::Relaxed);
//! })?;
//! assert_eq!(sum.load(Ordering::Relaxed), 10_000 * 9_999 / 2);
//! # Ok::<(), fanout_backends::BackendError>(())
//! ```

pub mod backend;
pub mod backends;
pub mod error;
pub mod partition;

pub use backend::{Backend, BackendTag, BlockContext, Dispatch, Kernel, LaunchConfig, Scheduler, DEFAULT_BLOCK_SIZE};
pub use backends::{DeviceGridBackend, ThreadPoolBackend};
pub use error::{BackendError, Result};
pub use partition::TaskPartitioner;
