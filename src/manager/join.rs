//! Fan-out/join over store operations.
//!
//! Each cookie gets its own store call; these helpers wait for the whole
//! batch. [`join_unbounded`] never gives up. [`join_within`] gives up after
//! a deadline and leaves the stragglers running detached.

use crate::base::cacheerror::CacheError;
use crate::cookies::store::StoreOpFuture;
use futures::future::join_all;
use std::time::Duration;

/// Outcome counts of a joined batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JoinSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl JoinSummary {
    pub fn from_results(results: &[Result<(), CacheError>]) -> Self {
        let failed = results.iter().filter(|r| r.is_err()).count();
        Self {
            succeeded: results.len() - failed,
            failed,
        }
    }
}

fn log_failures(operation: &'static str, results: &[Result<(), CacheError>]) {
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        tracing::warn!(operation, error = %err, "store operation failed");
    }
}

/// Wait for every operation in `ops`, however long it takes.
///
/// Results come back in the order the operations were issued.
pub async fn join_unbounded(
    operation: &'static str,
    ops: Vec<StoreOpFuture>,
) -> Vec<Result<(), CacheError>> {
    let results = join_all(ops).await;
    log_failures(operation, &results);
    results
}

/// Wait for every operation in `ops`, but no longer than `limit`.
///
/// On timeout the batch keeps running on its own task and
/// [`CacheError::Timeout`] is returned.
pub async fn join_within(
    operation: &'static str,
    ops: Vec<StoreOpFuture>,
    limit: Duration,
) -> Result<JoinSummary, CacheError> {
    if ops.is_empty() {
        return Ok(JoinSummary::default());
    }

    let issued = ops.len();
    let batch = tokio::spawn(join_all(ops));

    match tokio::time::timeout(limit, batch).await {
        Ok(Ok(results)) => {
            log_failures(operation, &results);
            Ok(JoinSummary::from_results(&results))
        }
        Ok(Err(e)) => {
            tracing::error!(operation, error = %e, "store operation batch task failed");
            Err(CacheError::store_failed(operation, e.to_string()))
        }
        Err(_) => {
            let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(operation, issued, after_ms, "stopped waiting for store operations");
            Err(CacheError::Timeout {
                operation,
                after_ms,
            })
        }
    }
}
