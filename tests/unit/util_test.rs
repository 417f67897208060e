//! Tests for utility functions

use prometheus_rate_queue::util::{init_tracing, now_ms, Priority, UnitId};

#[test]
fn test_priority_ordering() {
    assert!(Priority::clamped(2, 3) > Priority::clamped(1, 3));
    assert!(Priority::clamped(1, 3) > Priority::LOWEST);
}

#[test]
fn test_priority_clamping() {
    assert_eq!(Priority::clamped(-7, 3), Priority::LOWEST);
    assert_eq!(Priority::clamped(42, 3).value(), 2);
    assert_eq!(Priority::clamped(42, 1), Priority::LOWEST);
    assert_eq!(Priority::clamped(i64::MAX, u32::MAX).value(), u32::MAX - 1);
}

#[test]
fn test_unit_id() {
    let id = UnitId::from("file-17");
    assert_eq!(id.as_str(), "file-17");
    assert_eq!(id.to_string(), "file-17");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"file-17\"");
    assert_ne!(UnitId::generate(), UnitId::generate());
}

#[test]
fn test_now_ms_is_after_epoch() {
    assert!(now_ms() > 1_600_000_000_000);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized");
}
