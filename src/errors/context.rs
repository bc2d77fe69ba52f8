//! Error context enhancement utilities
//!
//! Small extension trait for attaching an operation or file to foreign errors
//! as they are lifted into [`PushError`].

use std::path::PathBuf;

use super::types::PushError;

/// Extension trait for adding context to error types
pub trait ErrorContextExt<T> {
    /// Add operation context to the error
    fn with_context(self, operation: impl Into<String>) -> Result<T, PushError>;

    /// Attribute the error to an operation on a file
    fn in_file_operation(
        self,
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
    ) -> Result<T, PushError>;
}

impl<T, E> ErrorContextExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context(self, operation: impl Into<String>) -> Result<T, PushError> {
        self.map_err(|e| PushError::Internal {
            message: format!("{}: {}", operation.into(), e),
            source: Some(Box::new(e)),
        })
    }

    fn in_file_operation(
        self,
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
    ) -> Result<T, PushError> {
        self.map_err(|e| PushError::io_with_source(path, operation, e))
    }
}
