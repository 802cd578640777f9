//! Convenience macros for performance tracing

/// Create a performance span that logs its duration when dropped.
///
/// # Syntax
///
/// ```text
/// perf_span!("name")
/// perf_span!("name", field1 = value1, field2 = value2, ...)
/// ```
///
/// # Example
///
/// ```rust
/// use fanout_tracing::perf_span;
///
/// {
///     let _span = perf_span!("local_sort", n = 1024);
///     // ... operation code ...
/// } // duration logged here
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, None)
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        let _span = tracing::debug_span!(
            "perf",
            name = $name,
            $($field = $value),+
        ).entered();
        $crate::performance::PerformanceSpan::new($name, None)
    }};
}

/// Emit a standardized performance event at debug level.
///
/// # Syntax
///
/// ```text
/// perf_event!("name", metric1 = value1, metric2 = value2, ...)
/// ```
#[macro_export]
macro_rules! perf_event {
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {
        tracing::debug!(
            event = $name,
            $($field = $value),+
        );
    };
}
