//! Easing curves and the tick-driven tween scheduler.
//!
//! Tweens advance only when ticked with a frame delta (milliseconds). A tween
//! with zero duration completes on its first tick, so completion handoffs
//! always fire.

pub mod functions;

use serde::{Deserialize, Serialize};

use functions::{bezier_ease_t, lerp_f32};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// CSS-style control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
}

impl Easing {
    pub fn control_points(&self) -> [f32; 4] {
        match self {
            Easing::Linear => [0.0, 0.0, 1.0, 1.0],
            Easing::EaseIn => [0.42, 0.0, 1.0, 1.0],
            Easing::EaseOut => [0.0, 0.0, 0.58, 1.0],
            Easing::EaseInOut => [0.42, 0.0, 0.58, 1.0],
            Easing::CubicBezier(c) => *c,
        }
    }

    #[inline]
    pub fn apply(&self, t: f32) -> f32 {
        let [x1, y1, x2, y2] = self.control_points();
        bezier_ease_t(t, x1, y1, x2, y2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub duration_ms: f32,
    pub easing: Easing,
}

impl Timing {
    pub const fn new(duration_ms: f32, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
        }
    }

    pub const fn instant() -> Self {
        Self::new(0.0, Easing::Linear)
    }
}

/// One running transition from `from` to `to`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    elapsed_ms: f32,
    timing: Timing,
}

impl Tween {
    pub fn new(from: f32, to: f32, timing: Timing) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            timing,
        }
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        if self.timing.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.timing.duration_ms).clamp(0.0, 1.0)
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        let p = self.progress();
        if p >= 1.0 {
            return self.to;
        }
        lerp_f32(self.from, self.to, self.timing.easing.apply(p))
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by `dt_ms`, returning the new value.
    pub fn advance(&mut self, dt_ms: f32) -> f32 {
        self.elapsed_ms += dt_ms.max(0.0);
        self.value()
    }
}

/// A scalar that is either at rest or driven by a tween. Setting a new target
/// supersedes the running tween, continuing from the current value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimatedValue {
    value: f32,
    tween: Option<Tween>,
}

impl AnimatedValue {
    pub const fn new(value: f32) -> Self {
        Self { value, tween: None }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value this animation will settle at.
    #[inline]
    pub fn target(&self) -> f32 {
        self.tween.map_or(self.value, |t| t.to)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Snap to `value`, cancelling any tween.
    pub fn jump(&mut self, value: f32) {
        self.value = value;
        self.tween = None;
    }

    /// Tween from the current value to `target`. Re-issuing the current target
    /// keeps the running tween.
    pub fn animate_to(&mut self, target: f32, timing: Timing) {
        if self.target() == target {
            return;
        }
        self.tween = Some(Tween::new(self.value, target, timing));
    }

    /// Restart from `from` towards `to`.
    pub fn animate_from(&mut self, from: f32, to: f32, timing: Timing) {
        self.value = from;
        self.tween = Some(Tween::new(from, to, timing));
    }

    /// Advance; returns true exactly on the tick the tween completes.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        self.value = tween.advance(dt_ms);
        if tween.is_finished() {
            self.tween = None;
            true
        } else {
            false
        }
    }
}
