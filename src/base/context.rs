//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO and JSON errors into context-rich `CacheError` variants.

use crate::base::cacheerror::CacheError;
use std::io;
use std::path::Path;

/// Extension trait for adding staging-file context to IO Results.
pub trait IoResultExt<T> {
    /// Attach the staging file path to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use webcache::base::context::IoResultExt;
    ///
    /// let json = std::fs::read_to_string(&path).staging_context(&path)?;
    /// // Error: "Staging I/O failed for /tmp/staged.json: permission denied"
    /// ```
    fn staging_context(self, path: &Path) -> Result<T, CacheError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn staging_context(self, path: &Path) -> Result<T, CacheError> {
        self.map_err(|e| CacheError::staging_io(path, e))
    }
}

/// Extension trait for attaching the file path to JSON decode failures.
pub trait JsonResultExt<T> {
    fn corrupt_context(self, path: &Path) -> Result<T, CacheError>;
}

impl<T> JsonResultExt<T> for Result<T, serde_json::Error> {
    fn corrupt_context(self, path: &Path) -> Result<T, CacheError> {
        self.map_err(|e| CacheError::staging_corrupt(path, e.to_string()))
    }
}
