//! Tests for audit sinks

use std::sync::Arc;

use prometheus_rate_queue::builders::QueueBuilder;
use prometheus_rate_queue::config::QueueConfig;
use prometheus_rate_queue::core::{
    build_audit_event, executor_fn, AuditAction, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
use prometheus_rate_queue::runtime::TokioSpawner;

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("unit1", "queue1", AuditAction::Submit, Some("payload".to_string()));
    sink.record(event);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].unit_id, "unit1");
    assert_eq!(events[0].queue, "queue1");
    assert_eq!(events[0].action, AuditAction::Submit);
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("unit1", "queue1", AuditAction::Submit, None));
    sink.record(build_audit_event("unit2", "queue1", AuditAction::Submit, None));
    sink.record(build_audit_event("unit3", "queue1", AuditAction::Submit, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].unit_id, "unit2"); // oldest evicted
    assert_eq!(events[1].unit_id, "unit3");
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event("unit1", "queue1", AuditAction::Complete, Some("done".to_string()));

    assert!(event.event_id.starts_with("unit1-complete-"));
    assert_eq!(event.detail, Some("done".to_string()));
    assert!(event.created_at_ms > 0);
}

#[test]
fn test_audit_action_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&AuditAction::Reject).unwrap(), "\"reject\"");
    assert_eq!(AuditAction::Clear.to_string(), "clear");
}

#[test]
fn test_tracing_sink_accepts_events() {
    TracingAuditSink.record(build_audit_event("unit1", "queue1", AuditAction::Start, None));
}

#[tokio::test]
async fn test_queue_records_lifecycle_events() {
    let sink = Arc::new(InMemoryAuditSink::new(100));
    let queue = QueueBuilder::new("audited", QueueConfig::new(10, 1, 3))
        .with_audit(sink.clone())
        .build(
            executor_fn(|n: u32| async move { Ok::<_, String>(n + 1) }),
            TokioSpawner::current().unwrap(),
        )
        .unwrap();

    let admitted = queue.submit(1, 0, None);
    let rejected = queue.submit(2, 0, None);
    assert!(rejected.await.unwrap_err().is_queue_full());
    assert_eq!(admitted.await.unwrap(), 2);

    assert_eq!(sink.events_for(AuditAction::Submit).len(), 1);
    assert_eq!(sink.events_for(AuditAction::Reject).len(), 1);
    assert_eq!(sink.events_for(AuditAction::Start).len(), 1);
    assert_eq!(sink.events_for(AuditAction::Complete).len(), 1);
    assert!(sink.events().iter().all(|e| e.queue == "audited"));

    let held = queue.submit(3, 0, None);
    assert_eq!(queue.clear(), 1);
    assert!(held.await.unwrap_err().is_cleared());

    let clears = sink.events_for(AuditAction::Clear);
    assert_eq!(clears.len(), 1);
    assert_eq!(clears[0].unit_id, "batch");
    assert_eq!(clears[0].detail.as_deref(), Some("1 units"));
}
