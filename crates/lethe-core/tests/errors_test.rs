use lethe_core::errors::*;

#[test]
fn lock_conflict_carries_both_versions() {
    let err = LetheError::OptimisticLockConflict {
        key: "mem-1".into(),
        expected_version: 4,
        actual_version: 5,
    };
    let msg = err.to_string();
    assert!(msg.contains("mem-1"));
    assert!(msg.contains('4'));
    assert!(msg.contains('5'));
    assert!(err.is_retryable());
    assert_eq!(err.kind(), "lock_conflict");
}

#[test]
fn not_found_is_not_retryable() {
    let err = LetheError::MemoryNotFound { key: "gone".into() };
    assert!(err.to_string().contains("gone"));
    assert!(!err.is_retryable());
}

#[test]
fn input_validation_is_not_retryable() {
    let err: LetheError = InputValidationError::NonFinite {
        name: "elapsed_ms",
        value: f64::NAN,
    }
    .into();
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("elapsed_ms"));
}

#[test]
fn range_check_reports_bounds() {
    let err = InputValidationError::check_range("weight", 2.0, 0.0, 1.0).unwrap_err();
    assert_eq!(
        err,
        InputValidationError::OutOfRange {
            name: "weight",
            value: 2.0,
            min: 0.0,
            max: 1.0
        }
    );
    assert!(InputValidationError::check_non_negative("n", -0.5).is_err());
    assert_eq!(InputValidationError::check_non_negative("n", 0.0), Ok(0.0));
}

#[test]
fn storage_error_converts_to_lethe_error() {
    let storage_err = StorageError::SqliteError {
        message: "disk full".into(),
    };
    let err: LetheError = storage_err.into();
    assert!(err.to_string().contains("disk full"));
    assert!(err.is_retryable());
}

#[test]
fn scheduler_error_converts_to_lethe_error() {
    let err: LetheError = SchedulerError::DuplicateTask { id: "decay".into() }.into();
    assert!(err.to_string().contains("decay"));
    assert_eq!(err.kind(), "scheduler");
}
