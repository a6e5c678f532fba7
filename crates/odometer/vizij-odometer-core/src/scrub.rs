//! Scrub width interpolator.
//!
//! While a continuous string driver is active every digit slot is forced to a
//! single width so the row cannot jitter as glyphs change each frame. When
//! the driver goes idle each slot eases back to its rest width.

use crate::config::ScrubConfig;
use crate::interp::{AnimatedValue, Easing, Timing};
use crate::layout::{DigitWidthMode, DigitWidthSource};
use crate::metrics::GlyphMetrics;

/// Forced digit width: `percentile` of the way through the sorted digit widths.
pub fn scrub_digit_width(metrics: &GlyphMetrics, percentile: f32) -> f32 {
    let sorted = metrics.sorted_digit_widths();
    let pos = percentile.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[derive(Clone, Debug, Default, PartialEq)]
struct ScrubSlot {
    last_digit: Option<u8>,
    width: Option<AnimatedValue>,
}

/// Per fixed slot index width overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrubWidths {
    cfg: ScrubConfig,
    scrub_width: f32,
    active: bool,
    slots: Vec<ScrubSlot>,
}

impl ScrubWidths {
    pub fn new(metrics: &GlyphMetrics, cfg: ScrubConfig) -> Self {
        Self {
            scrub_width: scrub_digit_width(metrics, cfg.percentile),
            cfg,
            active: false,
            slots: Vec::new(),
        }
    }

    /// Recompute the forced width after a font change.
    pub fn set_metrics(&mut self, metrics: &GlyphMetrics) {
        self.scrub_width = scrub_digit_width(metrics, self.cfg.percentile);
        if self.active {
            for slot in self.slots.iter_mut() {
                if let Some(w) = slot.width.as_mut() {
                    w.jump(self.scrub_width);
                }
            }
        }
    }

    #[inline]
    pub fn scrub_width(&self) -> f32 {
        self.scrub_width
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_animating(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.width.is_some_and(|w| w.is_animating()))
    }

    /// Feed the driver's current text. Non-empty text forces every digit
    /// position to the scrub width; empty text releases.
    pub fn drive(&mut self, text: &str, metrics: &GlyphMetrics, mode: DigitWidthMode) {
        if text.is_empty() {
            self.release(metrics, mode);
            return;
        }
        self.active = true;
        let chars: Vec<char> = text.chars().collect();
        self.slots.resize_with(chars.len(), ScrubSlot::default);
        for (slot, ch) in self.slots.iter_mut().zip(chars) {
            match ch.to_digit(10) {
                Some(d) if ch.is_ascii_digit() => {
                    slot.last_digit = Some(d as u8);
                    slot.width = Some(AnimatedValue::new(self.scrub_width));
                }
                _ => {
                    slot.last_digit = None;
                    slot.width = None;
                }
            }
        }
    }

    fn release(&mut self, metrics: &GlyphMetrics, mode: DigitWidthMode) {
        if !self.active {
            return;
        }
        self.active = false;
        let timing = Timing::new(self.cfg.release_ms, Easing::EaseOut);
        for slot in self.slots.iter_mut() {
            match (slot.last_digit, slot.width.as_mut()) {
                (Some(d), Some(w)) => w.animate_to(mode.rest_width(metrics, d), timing),
                _ => slot.width = None,
            }
        }
    }

    /// Advance release tweens. Settled slots drop their override.
    pub fn tick(&mut self, dt_ms: f32) {
        if self.active {
            return;
        }
        for slot in self.slots.iter_mut() {
            if let Some(w) = slot.width.as_mut() {
                if w.tick(dt_ms) || !w.is_animating() {
                    slot.width = None;
                }
            }
        }
        if self.slots.iter().all(|s| s.width.is_none()) {
            self.slots.clear();
        }
    }

    /// Current width override at a fixed slot index.
    #[inline]
    pub fn width_at(&self, index: usize) -> Option<f32> {
        self.slots
            .get(index)
            .and_then(|s| s.width.as_ref())
            .map(|w| w.value())
    }

    /// Last digit recorded at a fixed slot index.
    #[inline]
    pub fn last_digit_at(&self, index: usize) -> Option<u8> {
        self.slots.get(index).and_then(|s| s.last_digit)
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.slots.clear();
    }

    /// View whose indices are row positions, for rows that place `offset`
    /// prefix characters ahead of the driven text.
    #[inline]
    pub fn shifted(&self, offset: usize) -> ShiftedScrub<'_> {
        ShiftedScrub {
            scrub: self,
            offset,
        }
    }
}

/// [`ScrubWidths`] re-indexed past a prefix.
#[derive(Clone, Copy, Debug)]
pub struct ShiftedScrub<'a> {
    scrub: &'a ScrubWidths,
    offset: usize,
}

impl DigitWidthSource for ShiftedScrub<'_> {
    #[inline]
    fn digit_width(&self, index: usize, _digit: u8) -> Option<f32> {
        index
            .checked_sub(self.offset)
            .and_then(|i| self.scrub.width_at(i))
    }
}

impl DigitWidthSource for ScrubWidths {
    #[inline]
    fn digit_width(&self, index: usize, _digit: u8) -> Option<f32> {
        self.width_at(index)
    }
}
