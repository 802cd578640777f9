//! Types for dispatch configuration and launch geometry

use std::fmt;

use crate::error::{BackendError, Result};

/// Default number of lanes per device block
pub const DEFAULT_BLOCK_SIZE: u32 = 256;

/// CPU scheduling strategy for dispatched tasks
///
/// Both schedulers produce identical observable results for bodies whose
/// writes are disjoint per index; they differ only in dispatch overhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheduler {
    /// One scoped OS thread per task. General-purpose: tasks may block or
    /// perform I/O without starving unrelated work.
    Threads,
    /// Tasks run on the shared work-stealing pool. Low overhead: no thread
    /// launch cost per dispatch, but tasks must not block.
    #[default]
    Pool,
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduler::Threads => write!(f, "threads"),
            Scheduler::Pool => write!(f, "pool"),
        }
    }
}

/// Options controlling how a domain is divided into concurrent units
///
/// The CPU settings (`scheduler`, `max_tasks`, `min_elems`) and the device
/// setting (`block_size`) travel together so the same call site can target
/// either backend unchanged; each backend reads only the fields it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// CPU scheduling strategy
    pub scheduler: Scheduler,
    /// Upper bound on concurrent CPU tasks
    pub max_tasks: usize,
    /// Minimum number of elements per CPU task
    pub min_elems: usize,
    /// Lanes per device block, commonly a power of two
    pub block_size: u32,
}

impl Default for Dispatch {
    /// Defaults read the process-wide worker count once, at call time.
    fn default() -> Self {
        Self {
            scheduler: Scheduler::default(),
            max_tasks: num_cpus::get(),
            min_elems: 1,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Dispatch {
    /// Replace the scheduler
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replace the concurrent task ceiling
    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    /// Replace the per-task minimum granularity
    pub fn with_min_elems(mut self, min_elems: usize) -> Self {
        self.min_elems = min_elems;
        self
    }

    /// Replace the device block size
    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Options for dispatching one invocation per concurrent unit.
    ///
    /// Used when the domain being dispatched is already a set of units
    /// (one partial result per task or block): granularity constraints no
    /// longer apply, and on the device grid every unit gets its own block.
    pub fn unit_level(&self) -> Self {
        Self {
            min_elems: 1,
            block_size: 1,
            ..*self
        }
    }

    /// Reject configurations no backend can honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_tasks == 0 {
            return Err(BackendError::invalid_config("max_tasks must be >= 1"));
        }
        if self.min_elems == 0 {
            return Err(BackendError::invalid_config("min_elems must be >= 1"));
        }
        if self.block_size == 0 {
            return Err(BackendError::invalid_config("block_size must be >= 1"));
        }
        Ok(())
    }
}

/// One-dimensional launch geometry for a device grid
///
/// Defines the iteration space as `num_blocks` blocks of `block_size` lanes.
/// The grid may overhang the domain; out-of-bounds lanes are masked off by
/// the backend before the kernel observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaunchConfig {
    /// Number of blocks in the grid
    pub num_blocks: u64,
    /// Number of lanes per block
    pub block_size: u32,
}

impl LaunchConfig {
    /// Create a launch configuration covering `domain` indices with blocks of
    /// `block_size` lanes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidLaunchConfig`] if `block_size` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fanout_backends::LaunchConfig;
    ///
    /// let config = LaunchConfig::linear(1000, 256)?;
    /// assert_eq!(config.num_blocks, 4); // ceil(1000 / 256)
    /// assert_eq!(config.total_lanes(), 1024);
    /// # Ok::<(), fanout_backends::BackendError>(())
    /// ```
    pub fn linear(domain: usize, block_size: u32) -> Result<Self> {
        if block_size == 0 {
            return Err(BackendError::invalid_launch("block_size must be >= 1"));
        }
        let num_blocks = (domain as u64).div_ceil(block_size as u64);
        Ok(Self {
            num_blocks,
            block_size,
        })
    }

    /// Total number of lanes across all blocks
    pub const fn total_lanes(&self) -> u64 {
        self.num_blocks * self.block_size as u64
    }
}

impl fmt::Display for LaunchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid={} x block={}", self.num_blocks, self.block_size)
    }
}

/// Positional information for one lane of a grid launch
#[derive(Debug, Clone, Copy)]
pub struct BlockContext {
    /// Block index within the grid
    pub block_idx: u64,
    /// Lane index within the block
    pub lane_idx: u32,
    /// The launch geometry this lane belongs to
    pub config: LaunchConfig,
}

impl BlockContext {
    /// Create a lane context
    pub const fn new(block_idx: u64, lane_idx: u32, config: LaunchConfig) -> Self {
        Self {
            block_idx,
            lane_idx,
            config,
        }
    }

    /// Global linear lane index across the whole grid
    pub const fn global_index(&self) -> u64 {
        self.block_idx * self.config.block_size as u64 + self.lane_idx as u64
    }
}

// ================================================================================================
// Tests
// ================================================================================================
