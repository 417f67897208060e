//! Tests for error types

use prometheus_rate_queue::core::{ConfigError, QueueError, UnitError};

#[test]
fn test_queue_full_error() {
    let err = QueueError::QueueFull {
        capacity: 4,
        pending: 4,
    };
    assert_eq!(format!("{err}"), "queue full: 4 of 4 slots pending");
}

#[test]
fn test_queue_cleared_error() {
    let err = QueueError::QueueCleared;
    assert_eq!(format!("{err}"), "queue cleared before unit started");
}

#[test]
fn test_unit_error_is_transparent_over_queue_errors() {
    let err: UnitError<String> = QueueError::QueueCleared.into();
    assert_eq!(format!("{err}"), "queue cleared before unit started");
    assert!(err.is_cleared());
    assert!(!err.is_queue_full());
    assert_eq!(err.queue_error(), Some(&QueueError::QueueCleared));
}

#[test]
fn test_work_and_panic_errors() {
    let work: UnitError<String> = UnitError::Work("disk gone".into());
    assert_eq!(format!("{work}"), "work failed: disk gone");
    assert!(work.queue_error().is_none());

    let panicked: UnitError<String> = UnitError::Panicked("index out of bounds".into());
    assert_eq!(format!("{panicked}"), "work panicked: index out of bounds");
}

#[test]
fn test_config_error_from_serde() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: ConfigError = parse_err.into();
    assert!(format!("{err}").starts_with("config parse error"));

    let invalid = ConfigError::Invalid("capacity must be greater than 0".into());
    assert_eq!(
        format!("{invalid}"),
        "invalid queue config: capacity must be greater than 0"
    );
}
