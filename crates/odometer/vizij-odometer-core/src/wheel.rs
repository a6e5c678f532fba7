//! Digit wheel: cyclic 0-9 roll math and per-slot wheel state.
//!
//! A wheel tracks a continuous *virtual position* `v`; the centered glyph is
//! `round(v) mod 10`. `v` is split into an integer `base` (the committed
//! position) and an animated `offset` that always settles at 0, so a pending
//! roll of `delta` steps is represented by `offset = -delta` easing to 0.

use serde::{Deserialize, Serialize};

use crate::interp::{AnimatedValue, Timing};

/// Roll direction policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    /// Always roll upwards (9 → 0 wraps forward).
    Up,
    /// Always roll downwards.
    Down,
    /// Shortest path, never more than 5 steps.
    #[default]
    Shortest,
}

impl From<i32> for Trend {
    fn from(sign: i32) -> Self {
        match sign.signum() {
            1 => Trend::Up,
            -1 => Trend::Down,
            _ => Trend::Shortest,
        }
    }
}

impl Trend {
    pub fn as_sign(&self) -> i32 {
        match self {
            Trend::Up => 1,
            Trend::Down => -1,
            Trend::Shortest => 0,
        }
    }
}

/// Signed number of steps from digit `from` to digit `to`.
///
/// Shortest-path ties (|diff| == 5) always roll upwards: both 0→5 and 5→0
/// resolve to +5.
pub fn compute_roll_delta(from: u8, to: u8, trend: Trend) -> i32 {
    let p = (from % 10) as i32;
    let n = (to % 10) as i32;
    match trend {
        Trend::Up => {
            if n >= p {
                n - p
            } else {
                10 - p + n
            }
        }
        Trend::Down => {
            if n <= p {
                n - p
            } else {
                -(10 - n + p)
            }
        }
        Trend::Shortest => {
            let diff = n - p;
            if diff == -5 {
                5
            } else if diff.abs() <= 5 {
                diff
            } else {
                diff - 10 * diff.signum()
            }
        }
    }
}

/// Signed distance of glyph `glyph` from the centered position, in [-5, 5).
#[inline]
pub fn glyph_offset(glyph: u8, virtual_position: f32) -> f32 {
    let raw = ((glyph as f32 - virtual_position) % 10.0 + 10.0) % 10.0;
    if raw >= 5.0 {
        raw - 10.0
    } else {
        raw
    }
}

/// Offsets for all ten stacked glyphs, clamped to +/- `clamp` line heights.
/// Only the centered glyph and its neighbours fall inside the clip window.
pub fn glyph_offsets(virtual_position: f32, clamp: f32) -> [f32; 10] {
    let mut out = [0.0f32; 10];
    for (glyph, slot) in out.iter_mut().enumerate() {
        *slot = glyph_offset(glyph as u8, virtual_position).clamp(-clamp, clamp);
    }
    out
}

/// Digit shown at the center for a virtual position.
#[inline]
pub fn centered_digit(virtual_position: f32) -> u8 {
    (virtual_position.round() as i64).rem_euclid(10) as u8
}

/// Lifecycle of a rendered slot. Transitions only go forward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotPhase {
    Entering,
    Active,
    Exiting,
}

impl SlotPhase {
    #[inline]
    pub fn can_advance_to(&self, next: SlotPhase) -> bool {
        matches!(
            (self, next),
            (SlotPhase::Entering, SlotPhase::Active)
                | (SlotPhase::Entering, SlotPhase::Exiting)
                | (SlotPhase::Active, SlotPhase::Exiting)
        )
    }
}

/// Per-slot wheel state, owned by the animation context.
#[derive(Clone, Debug, PartialEq)]
pub struct DigitWheel {
    /// Last committed digit.
    current: u8,
    /// Integer resting position; `base mod 10 == current`.
    base: i32,
    /// Pending roll, settles at 0.
    offset: AnimatedValue,
    /// Last digit pushed by a continuous driver, while one is active.
    continuous: Option<u8>,
}

impl DigitWheel {
    /// Wheel resting on `digit`.
    pub fn new(digit: u8) -> Self {
        let digit = digit % 10;
        Self {
            current: digit,
            base: digit as i32,
            offset: AnimatedValue::new(0.0),
            continuous: None,
        }
    }

    #[inline]
    pub fn current_digit(&self) -> u8 {
        self.current
    }

    #[inline]
    pub fn virtual_position(&self) -> f32 {
        self.base as f32 + self.offset.value()
    }

    /// Remaining signed roll distance of the in-flight animation.
    #[inline]
    pub fn pending_delta(&self) -> f32 {
        -self.offset.value()
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.offset.is_animating()
    }

    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.continuous.is_some()
    }

    /// Digit the wheel is visibly centered on right now.
    #[inline]
    pub fn visible_digit(&self) -> u8 {
        centered_digit(self.virtual_position())
    }

    pub fn glyph_offsets(&self, clamp: f32) -> [f32; 10] {
        glyph_offsets(self.virtual_position(), clamp)
    }

    /// Keep `base` small; glyph offsets only depend on `v mod 10`.
    fn rebase(&mut self) {
        let wrapped = self.base.rem_euclid(10);
        self.base = wrapped;
    }

    /// Discrete update: replaces any pending roll with a fresh one from the
    /// committed digit. Suppressed while a continuous driver owns the wheel.
    /// Returns the applied delta, or None when suppressed.
    pub fn commit(&mut self, digit: u8, trend: Trend, timing: Timing) -> Option<i32> {
        if self.continuous.is_some() {
            return None;
        }
        let digit = digit % 10;
        let delta = compute_roll_delta(self.current, digit, trend);
        if delta == 0 {
            return Some(0);
        }
        self.rebase();
        self.base += delta;
        self.current = digit;
        self.offset.animate_from(-(delta as f32), 0.0, timing);
        Some(delta)
    }

    /// Continuous update: the new delta stacks on whatever is still pending,
    /// so rapid pushes compose into one spin. A negative digit marks the
    /// driver inactive and hands control back to the discrete path.
    pub fn push_continuous(&mut self, digit: i8, trend: Trend, timing: Timing) -> i32 {
        if !(0..=9).contains(&digit) {
            self.continuous = None;
            return 0;
        }
        let digit = digit as u8;
        self.continuous = Some(digit);
        self.accumulate_to(digit, trend, timing)
    }

    /// Release the continuous driver; returns the effective committed digit.
    pub fn release_continuous(&mut self) -> u8 {
        self.continuous = None;
        self.current
    }

    /// Roll towards `digit` starting from the current virtual position.
    pub fn accumulate_to(&mut self, digit: u8, trend: Trend, timing: Timing) -> i32 {
        let digit = digit % 10;
        let delta = compute_roll_delta(self.current, digit, trend);
        if delta == 0 {
            return 0;
        }
        let pending = self.offset.value();
        self.rebase();
        self.base += delta;
        self.current = digit;
        self.offset.animate_from(pending - delta as f32, 0.0, timing);
        delta
    }

    /// Exit animation: roll to 0 from wherever the wheel currently is.
    pub fn roll_to_zero(&mut self, trend: Trend, timing: Timing) -> i32 {
        self.continuous = None;
        self.accumulate_to(0, trend, timing)
    }

    /// Advance the roll; true when it settles this tick.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        self.offset.tick(dt_ms)
    }
}
