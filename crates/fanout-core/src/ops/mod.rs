//! Data-parallel primitives built on the dispatch layer
//!
//! ## Modules
//!
//! - `reduce` - map-reduce and reductions (sum, product, min, max, count)
//! - `scan` - prefix scans, inclusive and exclusive (cumsum, cumprod)
//! - `sort` - parallel comparison sort and sort permutations
//! - `search` - batched binary search over sorted sequences
//! - `predicate` - any / all / none with cooperative fast path

pub mod predicate;
pub mod reduce;
pub mod scan;
pub mod search;
pub mod sort;
