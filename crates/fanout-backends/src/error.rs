//! Error types for backend operations

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while partitioning or dispatching work
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Invalid partitioning parameters
    #[error("invalid partition configuration: {0}")]
    InvalidConfig(String),

    /// Invalid launch configuration
    #[error("invalid launch configuration: {0}")]
    InvalidLaunchConfig(String),

    /// Unsupported operation for this backend
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Execution error
    #[error("execution error: {0}")]
    ExecutionError(String),
}

impl BackendError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid launch configuration error
    pub fn invalid_launch(msg: impl Into<String>) -> Self {
        Self::InvalidLaunchConfig(msg.into())
    }

    /// Create an execution error
    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError(msg.into())
    }
}
