//! Timing guards for performance instrumentation
//!
//! A [`PerformanceSpan`] measures the wall-clock duration of a scope and
//! emits a `tracing` event when dropped. Spans below an optional threshold
//! are suppressed, keeping hot paths quiet unless they regress.

use std::time::Instant;

/// Guard that logs its lifetime duration on drop.
///
/// Usually created through the [`perf_span!`](crate::perf_span) macro.
pub struct PerformanceSpan {
    name: &'static str,
    start: Instant,
    /// Minimum duration in microseconds to log; `None` logs everything
    threshold_us: Option<u64>,
}

impl PerformanceSpan {
    /// Start timing a named scope.
    pub fn new(name: &'static str, threshold_us: Option<u64>) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_us,
        }
    }

    /// Microseconds elapsed since the span started.
    pub fn elapsed_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        let elapsed = self.elapsed_us();
        if let Some(threshold) = self.threshold_us {
            if elapsed < threshold {
                return;
            }
        }
        tracing::debug!(target: "fanout::perf", name = self.name, duration_us = elapsed);
    }
}
