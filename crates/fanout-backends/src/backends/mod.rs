//! Backend implementations for the supported execution targets
//!
//! - `thread_pool` - bounded CPU task pool over contiguous ranges
//! - `device_grid` - data-parallel grid of blocks and lanes

pub mod device_grid;
pub mod thread_pool;

pub use device_grid::DeviceGridBackend;
pub use thread_pool::ThreadPoolBackend;
