//! Tests for configuration validation

use prometheus_rate_queue::config::{QueueConfig, SchedulerConfig};
use prometheus_rate_queue::core::ConfigError;
use std::collections::HashMap;

#[test]
fn test_queue_config_validation() {
    let valid = QueueConfig::new(5, 100, 3);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_queue_config_invalid_window_limit() {
    let invalid = QueueConfig::default().with_window_limit(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_invalid_capacity() {
    let invalid = QueueConfig::default().with_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_invalid_priority_levels() {
    let invalid = QueueConfig::default().with_priority_levels(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_single_priority_level_is_valid() {
    assert!(QueueConfig::default().with_priority_levels(1).validate().is_ok());
}

#[test]
fn test_scheduler_config_validation() {
    let mut queues = HashMap::new();
    queues.insert("analysis".to_string(), QueueConfig::new(5, 50, 3));

    let config = SchedulerConfig { queues };
    assert!(config.validate().is_ok());
}

#[test]
fn test_scheduler_config_requires_a_queue() {
    let config = SchedulerConfig::default();
    assert!(config.validate().is_err());
}

#[test]
fn test_scheduler_config_names_invalid_queue() {
    let mut queues = HashMap::new();
    queues.insert("broken".to_string(), QueueConfig::new(5, 0, 3));

    let err = SchedulerConfig { queues }.validate().unwrap_err();
    assert!(err.contains("broken"));
    assert!(err.contains("capacity"));
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "queues": {
            "interactive": { "window_limit": 20, "capacity": 10, "priority_levels": 2 },
            "batch": { "window_limit": 2, "capacity": 500 }
        }
    }"#;

    let cfg = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.queues.len(), 2);
    assert_eq!(cfg.queues["interactive"].priority_levels, 2);
    assert_eq!(cfg.queues["batch"].priority_levels, 3);
}

#[test]
fn test_scheduler_config_from_bad_json() {
    assert!(matches!(
        SchedulerConfig::from_json_str("not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        SchedulerConfig::from_json_str(r#"{"queues": {}}"#),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_scheduler_config_load_from_file() {
    let path = std::env::temp_dir().join(format!("rate-queue-config-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"queues": {"default": {"window_limit": 4, "capacity": 8}}}"#,
    )
    .unwrap();

    let cfg = SchedulerConfig::load(&path).unwrap();
    assert_eq!(cfg.queues["default"], QueueConfig::new(4, 8, 3));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_scheduler_config_load_missing_file() {
    let err = SchedulerConfig::load("/nonexistent/rate-queue.json").unwrap_err();
    assert!(format!("{err:#}").contains("reading scheduler config"));
}
