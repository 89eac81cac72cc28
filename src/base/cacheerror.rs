use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by store adapters and the durable staging area.
///
/// None of these reach callers of [`WebCacheManager`](crate::manager::WebCacheManager):
/// data clearing always reports completion, so the manager logs them and
/// carries on. They exist for adapter authors and for the staging file.
#[derive(Debug, Error, Clone)]
pub enum CacheError {
    #[error("Staging I/O failed for {}: {source}", .path.display())]
    StagingIo {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Staging file {} is corrupt: {reason}", .path.display())]
    StagingCorrupt { path: PathBuf, reason: String },

    #[error("Store operation '{operation}' failed: {reason}")]
    StoreOperationFailed {
        operation: &'static str,
        reason: String,
    },
    #[error("Operation '{operation}' timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    #[error("Invalid cookie: {reason}")]
    InvalidCookie { reason: String },
}

impl CacheError {
    pub fn staging_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::StagingIo {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub fn staging_corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CacheError::StagingCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn store_failed(operation: &'static str, reason: impl Into<String>) -> Self {
        CacheError::StoreOperationFailed {
            operation,
            reason: reason.into(),
        }
    }

    pub fn invalid_cookie(reason: impl Into<String>) -> Self {
        CacheError::InvalidCookie {
            reason: reason.into(),
        }
    }

    /// True for failures that leave the staging area unusable.
    pub fn is_staging_error(&self) -> bool {
        matches!(
            self,
            CacheError::StagingIo { .. } | CacheError::StagingCorrupt { .. }
        )
    }
}

