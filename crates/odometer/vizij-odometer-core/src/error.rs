//! Error types for the odometer core.

use serde::{Deserialize, Serialize};

/// Errors surfaced to the host. Formatting problems never reach this type from
/// the keyed formatter; they degrade to an empty row instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum OdometerError {
    /// A layout needed more slots than the fixed pool provides.
    #[error("slot pool overflow: {requested} characters exceed the pool of {max} slots")]
    SlotPoolOverflow { requested: usize, max: usize },

    /// Configuration rejected by `Config::validate`.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A formatter could not be constructed from its options.
    #[error("format error: {reason}")]
    Format { reason: String },

    /// Glyph metrics are unusable (non-positive line height, NaN widths, ...).
    #[error("invalid glyph metrics: {reason}")]
    Metrics { reason: String },
}

impl OdometerError {
    /// Category string for logging / host diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::SlotPoolOverflow { .. } => "pool",
            Self::InvalidConfig { .. } => "config",
            Self::Format { .. } => "format",
            Self::Metrics { .. } => "metrics",
        }
    }
}

pub type Result<T> = std::result::Result<T, OdometerError>;
