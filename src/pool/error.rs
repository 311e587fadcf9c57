//! Worker pool error types.
//!
//! Only pool construction can fail. Failures of individual work items belong
//! to the processor and reach the caller untouched through its submission.

use std::fmt;

/// Errors that can occur while setting up a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool was created outside of a tokio runtime and no handle was given.
    NoRuntime,
}

impl PoolError {
    /// Check if this is a missing runtime error.
    pub fn is_no_runtime(&self) -> bool {
        matches!(self, PoolError::NoRuntime)
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::NoRuntime => "No tokio runtime",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::NoRuntime => {
                write!(
                    f,
                    "no tokio runtime: create the pool inside a runtime or pass a handle"
                )
            }
        }
    }
}

impl std::error::Error for PoolError {}

impl From<tokio::runtime::TryCurrentError> for PoolError {
    fn from(_: tokio::runtime::TryCurrentError) -> Self {
        PoolError::NoRuntime
    }
}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
