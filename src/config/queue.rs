//! Queue and scheduler configuration structures.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, ConfigError};

/// Default execution starts per window.
pub const DEFAULT_WINDOW_LIMIT: u32 = 10;
/// Default maximum pending units.
pub const DEFAULT_CAPACITY: usize = 100;
/// Default number of priority tiers.
pub const DEFAULT_PRIORITY_LEVELS: u32 = 3;

const fn default_priority_levels() -> u32 {
    DEFAULT_PRIORITY_LEVELS
}

/// Per-queue configuration. Immutable once the queue is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum execution starts per 1000 ms window.
    pub window_limit: u32,
    /// Maximum pending units (queued plus executing).
    pub capacity: usize,
    /// Number of priority tiers; priorities are clamped into `[0, levels - 1]`.
    #[serde(default = "default_priority_levels")]
    pub priority_levels: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            window_limit: DEFAULT_WINDOW_LIMIT,
            capacity: DEFAULT_CAPACITY,
            priority_levels: DEFAULT_PRIORITY_LEVELS,
        }
    }
}

impl QueueConfig {
    /// Create a config from explicit values.
    #[must_use]
    pub const fn new(window_limit: u32, capacity: usize, priority_levels: u32) -> Self {
        Self {
            window_limit,
            capacity,
            priority_levels,
        }
    }

    /// Set the window limit.
    #[must_use]
    pub const fn with_window_limit(mut self, window_limit: u32) -> Self {
        self.window_limit = window_limit;
        self
    }

    /// Set the capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the number of priority tiers.
    #[must_use]
    pub const fn with_priority_levels(mut self, priority_levels: u32) -> Self {
        self.priority_levels = priority_levels;
        self
    }

    /// Validate queue configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.window_limit == 0 {
            return Err("window_limit must be greater than 0".into());
        }
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.priority_levels == 0 {
            return Err("priority_levels must be at least 1".into());
        }
        Ok(())
    }

    /// Parse a queue configuration from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate().map_err(ConfigError::Invalid)?;
        Ok(cfg)
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Map of queue name to configuration.
    pub queues: HashMap<String, QueueConfig>,
}

impl SchedulerConfig {
    /// Validate all queues and ensure at least one queue exists.
    ///
    /// # Errors
    ///
    /// Returns a description naming the offending queue.
    pub fn validate(&self) -> Result<(), String> {
        if self.queues.is_empty() {
            return Err("at least one queue must be defined".into());
        }
        for (name, queue) in &self.queues {
            queue
                .validate()
                .map_err(|e| format!("queue `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate().map_err(ConfigError::Invalid)?;
        Ok(cfg)
    }

    /// Load and validate scheduler configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scheduler config {}", path.display()))?;
        let cfg = Self::from_json_str(&text)
            .with_context(|| format!("loading scheduler config {}", path.display()))?;
        tracing::info!(path = %path.display(), queues = cfg.queues.len(), "scheduler config loaded");
        Ok(cfg)
    }
}
