//! Tests for API request/response models

use prometheus_rate_queue::config::QueueConfig;
use prometheus_rate_queue::core::{DrainQueue, UnitState};
use prometheus_rate_queue::infra::{ClassifyExecutor, PayloadCategory};
use prometheus_rate_queue::runtime::{health, submit_unit, UnitSubmission};
use serde_json::{json, Value};
use std::time::Duration;

#[test]
fn test_health() {
    assert!(health().ok);
}

#[test]
fn test_submission_defaults() {
    let req: UnitSubmission<Value> = serde_json::from_value(json!({ "payload": "hi" })).unwrap();
    assert_eq!(req.priority, 0);
    assert!(req.unit_id.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_submit_unit_success() {
    let queue = DrainQueue::on_current_runtime(
        QueueConfig::new(5, 10, 3),
        ClassifyExecutor::new().with_latency(Duration::from_millis(20)),
    )
    .unwrap();

    let resp = submit_unit(
        &queue,
        UnitSubmission {
            unit_id: Some("req-1".into()),
            priority: 2,
            payload: json!({"path": "src/lib.rs", "lines": 120}),
        },
    )
    .await;

    assert_eq!(resp.unit_id.as_str(), "req-1");
    assert_eq!(resp.state, UnitState::Done);
    let result = resp.result.unwrap();
    assert_eq!(result.category, PayloadCategory::Structured);
    assert!(resp.error.is_none());
}

#[tokio::test]
async fn test_submit_unit_reports_work_failure() {
    let queue = DrainQueue::on_current_runtime(
        QueueConfig::new(5, 10, 3),
        prometheus_rate_queue::core::executor_fn(|_: Value| async move {
            Err::<u8, _>("backend unavailable".to_string())
        }),
    )
    .unwrap();

    let resp = submit_unit(
        &queue,
        UnitSubmission {
            unit_id: None,
            priority: 0,
            payload: json!("x"),
        },
    )
    .await;

    assert_eq!(resp.state, UnitState::Done);
    assert!(resp.result.is_none());
    assert_eq!(resp.error.as_deref(), Some("work failed: backend unavailable"));
}

#[tokio::test(start_paused = true)]
async fn test_submit_unit_reports_rejection() {
    let queue =
        DrainQueue::on_current_runtime(QueueConfig::new(5, 1, 3), ClassifyExecutor::new()).unwrap();

    let occupying = queue.submit(json!("first"), 0, None);
    let resp = submit_unit(
        &queue,
        UnitSubmission {
            unit_id: Some("late".into()),
            priority: 2,
            payload: json!("second"),
        },
    )
    .await;

    assert_eq!(resp.state, UnitState::Rejected);
    assert!(resp.error.unwrap().starts_with("queue full"));
    assert!(occupying.await.is_ok());

    let encoded = serde_json::to_value(queue.status()).unwrap();
    assert_eq!(encoded["pending_count"], 0);
}
