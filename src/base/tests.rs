use crate::base::cacheerror::CacheError;
use crate::base::clearstate::ClearState;
use std::io;

#[test]
fn test_staging_errors_are_classified() {
    let io_err = CacheError::staging_io("/tmp/x.json", io::Error::other("disk full"));
    assert!(io_err.is_staging_error());

    let corrupt = CacheError::staging_corrupt("/tmp/x.json", "bad json");
    assert!(corrupt.is_staging_error());

    assert!(!CacheError::store_failed("delete_cookie", "gone").is_staging_error());
}

#[test]
fn test_error_messages_carry_context() {
    let err = CacheError::Timeout {
        operation: "delete_cookie",
        after_ms: 5000,
    };
    assert_eq!(
        err.to_string(),
        "Operation 'delete_cookie' timed out after 5000ms"
    );

    let err = CacheError::store_failed("set_cookie", "store closed");
    assert_eq!(
        err.to_string(),
        "Store operation 'set_cookie' failed: store closed"
    );
}

#[test]
fn test_errors_are_cloneable() {
    let err = CacheError::staging_io("a.json", io::Error::new(io::ErrorKind::NotFound, "x"));
    let cloned = err.clone();
    assert_eq!(err.to_string(), cloned.to_string());
}

#[test]
fn test_clear_state_default_is_idle() {
    assert_eq!(ClearState::default(), ClearState::Idle);
    assert_eq!(ClearState::Extracting.as_str(), "extracting");
}
