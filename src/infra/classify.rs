//! Default work function: shallow payload classification.
//!
//! Looks only at the JSON shape of a payload, assigns one of a closed set of
//! categories and a size-driven confidence, and waits a fixed synthetic
//! latency standing in for a backend call. Queues serving a real analysis
//! backend should supply their own [`TaskExecutor`].

use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{TaskExecutor, UnitMetadata};

/// Confidence never exceeds this cap.
pub const MAX_CONFIDENCE: f64 = 0.95;
/// Confidence of an empty text or structured payload.
pub const BASE_CONFIDENCE: f64 = 0.5;
/// Confidence gained per character, key or element.
pub const CONFIDENCE_PER_UNIT: f64 = 0.01;
/// Default synthetic backend latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

/// Closed set of payload categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadCategory {
    /// A JSON string.
    Text,
    /// A JSON object or array.
    Structured,
    /// Anything else (number, bool, null).
    Unknown,
}

/// Result of classifying one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Detected category.
    pub category: PayloadCategory,
    /// Confidence in `[0, 0.95]`.
    pub confidence: f64,
    /// Characters, keys or elements inspected.
    pub size: usize,
}

/// Classify a payload by shape.
#[must_use]
pub fn classify(payload: &Value) -> Classification {
    let (category, size) = match payload {
        Value::String(s) => (PayloadCategory::Text, s.chars().count()),
        Value::Object(map) => (PayloadCategory::Structured, map.len()),
        Value::Array(items) => (PayloadCategory::Structured, items.len()),
        Value::Null | Value::Bool(_) | Value::Number(_) => (PayloadCategory::Unknown, 0),
    };
    Classification {
        category,
        confidence: confidence_for(category, size),
        size,
    }
}

#[allow(clippy::cast_precision_loss)]
fn confidence_for(category: PayloadCategory, size: usize) -> f64 {
    match category {
        PayloadCategory::Unknown => 0.0,
        PayloadCategory::Text | PayloadCategory::Structured => {
            CONFIDENCE_PER_UNIT.mul_add(size as f64, BASE_CONFIDENCE).min(MAX_CONFIDENCE)
        }
    }
}

/// Executor running [`classify`] behind a fixed latency.
#[derive(Debug, Clone)]
pub struct ClassifyExecutor {
    latency: Duration,
}

impl ClassifyExecutor {
    /// Executor with the default latency.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
        }
    }

    /// Override the synthetic latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Configured latency.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for ClassifyExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskExecutor<Value> for ClassifyExecutor {
    type Output = Classification;
    type Error = Infallible;

    async fn execute(&self, payload: Value, meta: UnitMetadata) -> Result<Classification, Infallible> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = classify(&payload);
        tracing::trace!(
            unit_id = %meta.id,
            category = ?result.category,
            confidence = result.confidence,
            "payload classified"
        );
        Ok(result)
    }
}
