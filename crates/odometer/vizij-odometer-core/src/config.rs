//! Core configuration for vizij-odometer-core.

use serde::{Deserialize, Serialize};

use crate::error::{OdometerError, Result};
use crate::interp::{Easing, Timing};
use crate::layout::{Alignment, DigitWidthMode};
use crate::wheel::Trend;

/// Engine sizing, timing and layout policy.
///
/// Every field has a default, so hosts may pass a partial JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Size of the fixed slot pool. Layouts with more characters are rejected.
    pub max_slots: usize,
    /// Roll direction policy for digit wheels.
    pub trend: Trend,
    /// Horizontal alignment of the row inside its container.
    pub alignment: Alignment,
    /// Resting width policy for digit slots.
    pub digit_width: DigitWidthMode,
    /// Timing of a digit wheel settling onto its target.
    pub digit_timing: Timing,
    /// Fade timing for entering and exiting slots.
    pub opacity_timing: Timing,
    /// Timing of x / width reflow when the row changes shape.
    pub transform_timing: Timing,
    pub scrub: ScrubConfig,
    /// Glyph offsets are clamped to +/- this many line heights.
    pub glyph_clamp: f32,
    /// When false every tween resolves on the next tick.
    pub animated: bool,
    /// Decimal separator assumed by the literal (pre-formatted text) path.
    pub decimal_separator: char,
}

/// Tabular width forcing while a continuous driver is active.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Position of the forced width between the narrowest (0.0) and widest (1.0) digit.
    pub percentile: f32,
    /// Duration of the width release once the driver goes idle.
    pub release_ms: f32,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            percentile: 0.75,
            release_ms: 200.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_slots: 20,
            trend: Trend::Shortest,
            alignment: Alignment::End,
            digit_width: DigitWidthMode::Tabular,
            digit_timing: Timing::new(900.0, Easing::EaseOut),
            opacity_timing: Timing::new(450.0, Easing::EaseOut),
            transform_timing: Timing::new(900.0, Easing::EaseOut),
            scrub: ScrubConfig::default(),
            glyph_clamp: 1.5,
            animated: true,
            decimal_separator: '.',
        }
    }
}

impl Config {
    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_slots == 0 {
            return Err(OdometerError::InvalidConfig {
                reason: "max_slots must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.scrub.percentile) {
            return Err(OdometerError::InvalidConfig {
                reason: format!(
                    "scrub.percentile must lie in [0, 1], got {}",
                    self.scrub.percentile
                ),
            });
        }
        let durations = [
            ("digit_timing", self.digit_timing.duration_ms),
            ("opacity_timing", self.opacity_timing.duration_ms),
            ("transform_timing", self.transform_timing.duration_ms),
            ("scrub.release_ms", self.scrub.release_ms),
        ];
        for (name, ms) in durations {
            if !ms.is_finite() || ms < 0.0 {
                return Err(OdometerError::InvalidConfig {
                    reason: format!("{name} must be a finite, non-negative duration, got {ms}"),
                });
            }
        }
        if !self.glyph_clamp.is_finite() || self.glyph_clamp <= 0.0 {
            return Err(OdometerError::InvalidConfig {
                reason: format!("glyph_clamp must be positive, got {}", self.glyph_clamp),
            });
        }
        Ok(())
    }

    /// Timing actually used for a tween, honoring `animated`.
    #[inline]
    pub(crate) fn effective(&self, timing: Timing) -> Timing {
        if self.animated {
            timing
        } else {
            Timing::instant()
        }
    }
}
