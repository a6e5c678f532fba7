//! Layout engine: keyed characters + glyph metrics → absolute x / width.

use serde::{Deserialize, Serialize};

use crate::ids::SlotKey;
use crate::keyed::{key_literal, CharKind, KeyedPart};
use crate::metrics::GlyphMetrics;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Start,
    Center,
    #[default]
    End,
}

/// How much room a digit slot reserves when nothing overrides it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DigitWidthMode {
    /// Every digit reserves the widest digit's advance, so rolling never clips.
    #[default]
    Tabular,
    /// Each digit reserves its own glyph advance.
    Proportional,
}

impl DigitWidthMode {
    #[inline]
    pub fn rest_width(&self, metrics: &GlyphMetrics, digit: u8) -> f32 {
        match self {
            DigitWidthMode::Tabular => metrics.max_digit_width,
            DigitWidthMode::Proportional => metrics.digit_width(digit),
        }
    }
}

/// Per-index digit width substitutes (e.g. forced tabular width while scrubbing).
pub trait DigitWidthSource {
    /// Width for the digit at sequence position `index`, or None to use the rest width.
    fn digit_width(&self, index: usize, digit: u8) -> Option<f32>;
}

/// No overrides.
pub struct RestWidths;

impl DigitWidthSource for RestWidths {
    #[inline]
    fn digit_width(&self, _index: usize, _digit: u8) -> Option<f32> {
        None
    }
}

/// A keyed character placed on the row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharLayout {
    pub key: SlotKey,
    pub kind: CharKind,
    #[serde(rename = "char")]
    pub ch: char,
    pub digit_value: i8,
    pub x: f32,
    pub width: f32,
}

impl CharLayout {
    #[inline]
    pub fn digit(&self) -> Option<u8> {
        match self.kind {
            CharKind::Digit if (0..=9).contains(&self.digit_value) => Some(self.digit_value as u8),
            _ => None,
        }
    }
}

/// Inputs shared by both layout entry points.
#[derive(Clone, Copy, Debug)]
pub struct LayoutParams<'a> {
    pub metrics: &'a GlyphMetrics,
    pub container_width: f32,
    pub alignment: Alignment,
    pub digit_width: DigitWidthMode,
}

impl<'a> LayoutParams<'a> {
    pub fn new(metrics: &'a GlyphMetrics, container_width: f32, alignment: Alignment) -> Self {
        Self {
            metrics,
            container_width,
            alignment,
            digit_width: DigitWidthMode::Tabular,
        }
    }
}

/// Starting x for a row of `content` width.
#[inline]
pub fn start_x(container: f32, content: f32, alignment: Alignment) -> f32 {
    match alignment {
        Alignment::Start => 0.0,
        Alignment::Center => (container - content) / 2.0,
        Alignment::End => container - content,
    }
}

/// Width reserved by one character.
#[inline]
fn reserved_width(
    part: &KeyedPart,
    index: usize,
    params: &LayoutParams<'_>,
    overrides: &dyn DigitWidthSource,
) -> f32 {
    match part.kind {
        CharKind::Digit if (0..=9).contains(&part.digit_value) => {
            let digit = part.digit_value as u8;
            overrides
                .digit_width(index, digit)
                .unwrap_or_else(|| params.digit_width.rest_width(params.metrics, digit))
        }
        _ => params.metrics.width_of(part.ch),
    }
}

/// Place keyed parts on the row.
pub fn layout_parts(parts: &[KeyedPart], params: &LayoutParams<'_>) -> Vec<CharLayout> {
    layout_parts_with(parts, params, &RestWidths)
}

/// Place keyed parts, consulting `overrides` for digit widths.
pub fn layout_parts_with(
    parts: &[KeyedPart],
    params: &LayoutParams<'_>,
    overrides: &dyn DigitWidthSource,
) -> Vec<CharLayout> {
    let widths: Vec<f32> = parts
        .iter()
        .enumerate()
        .map(|(i, p)| reserved_width(p, i, params, overrides))
        .collect();
    let content: f32 = widths.iter().sum();
    let mut x = start_x(params.container_width, content, params.alignment);

    parts
        .iter()
        .zip(widths)
        .map(|(part, width)| {
            let slot = CharLayout {
                key: part.key,
                kind: part.kind,
                ch: part.ch,
                digit_value: part.digit_value,
                x,
                width,
            };
            x += width;
            slot
        })
        .collect()
}

/// Place a raw literal string (continuous drivers) between `prefix` and
/// `suffix`. Keys are positional; see [`key_literal`].
pub fn layout_literal(
    text: &str,
    decimal_separator: char,
    prefix: &str,
    suffix: &str,
    params: &LayoutParams<'_>,
    overrides: &dyn DigitWidthSource,
) -> Vec<CharLayout> {
    let parts = key_literal(text, decimal_separator, prefix, suffix);
    layout_parts_with(&parts, params, overrides)
}

/// Total reserved width of a placed row.
pub fn content_width(layout: &[CharLayout]) -> f32 {
    layout.iter().map(|c| c.width).sum()
}
