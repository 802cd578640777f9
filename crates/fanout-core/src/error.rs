//! Error types for fanout-core algorithms

/// Result type for fanout-core algorithms
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the algorithm layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Dispatch or partitioning failure from the backend layer
    #[error(transparent)]
    Backend(#[from] fanout_backends::BackendError),

    /// Two buffers that must have equal lengths do not
    #[error("length mismatch: {what} has {actual} elements, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A caller-supplied scratch buffer is too small for the call.
    ///
    /// Scratch buffers are borrowed, never resized; supply one of at least
    /// the required length or pass `None` for a call-scoped allocation.
    #[error("scratch buffer too small: {actual} elements, need {required}")]
    ScratchTooSmall { required: usize, actual: usize },
}

impl Error {
    pub(crate) fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            actual,
        }
    }
}
