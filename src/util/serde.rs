//! Serializable identifier and priority types shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque unit identifier, caller-supplied or generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Wrap a caller-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Priority tier. Higher tiers are served first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(u32);

impl Priority {
    /// Lowest tier.
    pub const LOWEST: Self = Self(0);

    /// Clamp a raw priority hint into `[0, levels - 1]`.
    ///
    /// `levels` of zero is treated as one tier.
    #[must_use]
    pub fn clamped(raw: i64, levels: u32) -> Self {
        let top = i64::from(levels.max(1) - 1);
        // top fits in u32, so the clamped value does too
        Self(u32::try_from(raw.clamp(0, top)).unwrap_or_default())
    }

    /// Numeric tier value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
