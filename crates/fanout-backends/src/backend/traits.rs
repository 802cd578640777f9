//! Backend trait for parallel dispatch
//!
//! This trait is the only surface the algorithm layer sees. Backends take a
//! per-index kernel and an index domain and guarantee exactly one invocation
//! per index; how the domain is cut into concurrent units is a backend
//! concern, steered by [`Dispatch`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                Backend trait                 │
//! │  - submit(domain, opts, kernel)              │
//! │  - unit_partition(n, opts)                   │
//! │  - thread_count() / tag()                    │
//! └──────────────┬───────────────┬───────────────┘
//!                ▼               ▼
//!      ┌──────────────────┐  ┌──────────────────┐
//!      │ ThreadPoolBackend│  │ DeviceGridBackend│
//!      │ tasks over ranges│  │ blocks of lanes  │
//!      └──────────────────┘  └──────────────────┘
//! ```

use crate::backend::types::Dispatch;
use crate::error::Result;
use crate::partition::TaskPartitioner;

/// Identifies the execution model of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendTag {
    /// Bounded pool of CPU tasks over contiguous ranges
    Cpu,
    /// Data-parallel grid of blocks and lanes
    DeviceGrid,
}

impl std::fmt::Display for BackendTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendTag::Cpu => write!(f, "cpu"),
            BackendTag::DeviceGrid => write!(f, "device-grid"),
        }
    }
}

/// A per-index operation that can cross the dispatch boundary.
///
/// Kernels are captured by value and must be plain, fixed-layout data:
/// `Copy + Send + Sync`. Closures over shared references satisfy this; a
/// closure owning non-`Copy` state (boxed values, growable buffers) is
/// rejected at the submission boundary by the compiler, which is where
/// unsupported-capture launch failures belong. Kernels must not block,
/// allocate, or panic on in-bounds indices.
pub trait Kernel: Fn(usize) + Copy + Send + Sync {}

impl<F> Kernel for F where F: Fn(usize) + Copy + Send + Sync {}

/// Dispatch capability consumed by the algorithm layer
///
/// Implementations guarantee that `submit` invokes the kernel exactly once
/// per index in `[0, domain)`. Invocation order is unspecified across
/// concurrent units; two concurrent invocations may not assume visibility of
/// each other's writes unless their index sets are disjoint by construction.
pub trait Backend: Sync {
    /// The execution model of this backend
    fn tag(&self) -> BackendTag;

    /// Number of workers available for concurrent units.
    ///
    /// An explicit configuration value, read at call time; backends never
    /// consult hidden global state after construction.
    fn thread_count(&self) -> usize;

    /// Invoke `kernel` once for every index in `[0, domain)`.
    ///
    /// # Errors
    ///
    /// Fails on invalid dispatch options or launch geometry. Failures
    /// propagate unchanged to the caller; no retries are attempted.
    fn submit<K: Kernel>(&self, domain: usize, opts: &Dispatch, kernel: K) -> Result<()>;

    /// The partition of `[0, n)` into this backend's concurrent units under
    /// `opts`: per-task ranges on the CPU, per-block ranges on a device grid.
    ///
    /// Algorithms that produce one partial result per unit size their
    /// intermediate storage from this partition.
    fn unit_partition(&self, n: usize, opts: &Dispatch) -> Result<TaskPartitioner>;

    /// Number of concurrent units dispatched since construction or the last
    /// [`reset_dispatch_stats`](Backend::reset_dispatch_stats).
    ///
    /// Inline execution on the calling thread dispatches zero units; tests
    /// assert the small-domain fast path through this counter.
    fn dispatched_units(&self) -> u64;

    /// Reset the dispatched-unit counter to zero
    fn reset_dispatch_stats(&self);
}
