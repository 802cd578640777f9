//! Parallel predicates: `any`, `all`, `none`
//!
//! Evaluation never short-circuits; every element is visited. Two modes:
//!
//! - **Cooperative** (opt-in): each unit that decides the outcome stores the
//!   same sentinel into one shared flag with relaxed ordering and no other
//!   synchronization. Since every writer stores the identical value, the
//!   race is benign. Not every platform defines concurrent same-cell
//!   writes, so the mode is an explicit caller choice, never a runtime
//!   detection. Here the store is a relaxed atomic, which keeps the
//!   no-synchronization cost profile while staying well-defined on the
//!   host.
//! - **Non-cooperative** (fallback): a map-reduce with logical or/and.
//!   Always safe, forgoes the shared-flag shortcut.
//!
//! Both modes return the same boolean on every input.

use std::sync::atomic::{AtomicBool, Ordering};

use fanout_backends::{Backend, Dispatch};
use tracing::instrument;

use crate::error::Result;
use crate::ops::reduce::map_reduce;

/// True if `pred` holds for at least one element. False for empty input.
#[instrument(skip_all, fields(n = input.len(), cooperative = cooperative, backend = %backend.tag()))]
pub fn any<T, B, P>(backend: &B, input: &[T], pred: P, cooperative: bool, opts: &Dispatch) -> Result<bool>
where
    B: Backend,
    T: Sync,
    P: Fn(&T) -> bool + Copy + Send + Sync,
{
    if input.is_empty() {
        return Ok(false);
    }
    if cooperative {
        let found = AtomicBool::new(false);
        let found_ref = &found;
        backend.submit(input.len(), opts, |i| {
            if pred(&input[i]) {
                // Every writer stores the same value
                found_ref.store(true, Ordering::Relaxed);
            }
        })?;
        Ok(found.load(Ordering::Relaxed))
    } else {
        map_reduce(backend, input, |x| pred(x), |a, b| a | b, false, false, opts)
    }
}

/// True if `pred` holds for every element. True for empty input.
#[instrument(skip_all, fields(n = input.len(), cooperative = cooperative, backend = %backend.tag()))]
pub fn all<T, B, P>(backend: &B, input: &[T], pred: P, cooperative: bool, opts: &Dispatch) -> Result<bool>
where
    B: Backend,
    T: Sync,
    P: Fn(&T) -> bool + Copy + Send + Sync,
{
    if input.is_empty() {
        return Ok(true);
    }
    if cooperative {
        let violated = AtomicBool::new(false);
        let violated_ref = &violated;
        backend.submit(input.len(), opts, |i| {
            if !pred(&input[i]) {
                violated_ref.store(true, Ordering::Relaxed);
            }
        })?;
        Ok(!violated.load(Ordering::Relaxed))
    } else {
        map_reduce(backend, input, |x| pred(x), |a, b| a & b, true, true, opts)
    }
}

/// True if `pred` holds for no element. True for empty input.
pub fn none<T, B, P>(backend: &B, input: &[T], pred: P, cooperative: bool, opts: &Dispatch) -> Result<bool>
where
    B: Backend,
    T: Sync,
    P: Fn(&T) -> bool + Copy + Send + Sync,
{
    Ok(!any(backend, input, pred, cooperative, opts)?)
}

// ================================================================================================
// Tests
// ================================================================================================
