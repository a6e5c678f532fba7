//! Glyph metrics table and an injectable per-font cache.

use std::hash::Hash;
use std::num::NonZeroUsize;

use hashbrown::HashMap;
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::error::{OdometerError, Result};

fn default_fallback_width() -> f32 {
    0.0
}

/// Host-side glyph measurement (text shaper, canvas `measureText`, ...).
pub trait GlyphMeasurer {
    fn measure(&self, ch: char) -> f32;
    fn line_height(&self) -> f32;
}

/// Per-character advance widths for one font configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphMetrics {
    #[serde(default)]
    pub char_widths: HashMap<char, f32>,
    /// Uniform digit slot width; the widest of 0-9.
    pub max_digit_width: f32,
    pub line_height: f32,
    /// Width used for characters missing from `char_widths`. Zero means
    /// "use `max_digit_width`".
    #[serde(default = "default_fallback_width")]
    pub default_width: f32,
}

const DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

impl GlyphMetrics {
    /// Build a table from explicit widths; `max_digit_width` is derived.
    pub fn from_widths(char_widths: HashMap<char, f32>, line_height: f32) -> Self {
        let max_digit_width = DIGITS
            .iter()
            .filter_map(|d| char_widths.get(d).copied())
            .fold(0.0f32, f32::max);
        Self {
            char_widths,
            max_digit_width,
            line_height,
            default_width: 0.0,
        }
    }

    /// Measure digits plus `extra` characters with a host measurer.
    pub fn measure(measurer: &dyn GlyphMeasurer, extra: &str) -> Self {
        let mut widths = HashMap::new();
        for ch in DIGITS.iter().copied().chain(extra.chars()) {
            widths.entry(ch).or_insert_with(|| measurer.measure(ch));
        }
        Self::from_widths(widths, measurer.line_height())
    }

    /// Monospace table: every glyph is `width` wide.
    pub fn monospace(width: f32, line_height: f32) -> Self {
        Self {
            char_widths: HashMap::new(),
            max_digit_width: width,
            line_height,
            default_width: width,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(OdometerError::Metrics {
                reason: format!("line_height must be positive, got {}", self.line_height),
            });
        }
        if !self.max_digit_width.is_finite() || self.max_digit_width < 0.0 {
            return Err(OdometerError::Metrics {
                reason: format!("max_digit_width must be non-negative, got {}", self.max_digit_width),
            });
        }
        if let Some((ch, w)) = self
            .char_widths
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(OdometerError::Metrics {
                reason: format!("width for {ch:?} is invalid: {w}"),
            });
        }
        Ok(())
    }

    /// Advance of `ch`, falling back to the default width for unknown glyphs.
    #[inline]
    pub fn width_of(&self, ch: char) -> f32 {
        match self.char_widths.get(&ch) {
            Some(w) => *w,
            None if self.default_width > 0.0 => self.default_width,
            None => self.max_digit_width,
        }
    }

    /// Natural (proportional) width of a digit glyph.
    #[inline]
    pub fn digit_width(&self, digit: u8) -> f32 {
        self.width_of(char::from(b'0' + digit.min(9)))
    }

    /// Digit widths sorted narrowest first.
    pub fn sorted_digit_widths(&self) -> [f32; 10] {
        let mut widths = [0.0f32; 10];
        for (d, w) in widths.iter_mut().enumerate() {
            *w = self.digit_width(d as u8);
        }
        widths.sort_by(|a, b| a.total_cmp(b));
        widths
    }
}

/// Memoized metrics keyed by font identity (family, size, weight, ...).
pub struct MetricsCache<K: Hash + Eq> {
    inner: LruCache<K, GlyphMetrics>,
}

impl<K: Hash + Eq> MetricsCache<K> {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(cap),
        }
    }

    /// Return cached metrics for `key`, measuring on a miss.
    pub fn get_or_measure<F>(&mut self, key: K, measure: F) -> &GlyphMetrics
    where
        F: FnOnce() -> GlyphMetrics,
    {
        self.inner.get_or_insert(key, measure)
    }

    pub fn get(&mut self, key: &K) -> Option<&GlyphMetrics> {
        self.inner.get(key)
    }

    pub fn invalidate(&mut self, key: &K) -> Option<GlyphMetrics> {
        self.inner.pop(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
