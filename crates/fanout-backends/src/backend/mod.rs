//! Backend interface: dispatch options, launch geometry, and the capability
//! trait implemented by every execution target

pub mod traits;
pub mod types;

pub use traits::{Backend, BackendTag, Kernel};
pub use types::{BlockContext, Dispatch, LaunchConfig, Scheduler, DEFAULT_BLOCK_SIZE};
