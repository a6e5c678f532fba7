//! Number-to-parts formatting service.
//!
//! The engine treats formatting as an opaque collaborator: anything that can
//! turn a value into typed parts (`Intl.NumberFormat#formatToParts` on the web,
//! the built-in [`DecimalFormatter`] / [`TimeFormatter`] natively) implements
//! [`PartsFormatter`].

pub mod decimal;
pub mod time;

use serde::{Deserialize, Serialize};

pub use decimal::{CurrencyAffix, CurrencyPlacement, DecimalFormatOptions, DecimalFormatter, SignDisplay};
pub use time::{TimeFormatOptions, TimeFormatter, TimeValue};

/// Kind of a formatted part. Names follow the `formatToParts` vocabulary so
/// host-side parts deserialize directly; unknown kinds become `Literal`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartKind {
    Integer,
    Group,
    Decimal,
    Fraction,
    MinusSign,
    PlusSign,
    PercentSign,
    Currency,
    Compact,
    Hour,
    Minute,
    Second,
    DayPeriod,
    #[serde(other)]
    Literal,
}

/// One typed run of text produced by a formatter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberPart {
    #[serde(rename = "type", alias = "kind")]
    pub kind: PartKind,
    #[serde(rename = "value", alias = "text")]
    pub text: String,
}

impl NumberPart {
    pub fn new(kind: PartKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FormatError {
    /// The formatter cannot decompose into parts; callers fall back to `format`.
    #[error("formatter does not support part decomposition")]
    Unsupported,
    #[error("cannot format non-finite value {0}")]
    NonFinite(f64),
    #[error("invalid format options: {0}")]
    InvalidOptions(String),
    /// Failure reported by a host-provided formatter.
    #[error("host formatter failed: {0}")]
    Host(String),
}

/// Locale-aware value → parts service.
pub trait PartsFormatter {
    fn format_to_parts(&self, value: f64) -> Result<Vec<NumberPart>, FormatError>;

    /// Plain string rendering; defaults to concatenating the parts.
    fn format(&self, value: f64) -> Result<String, FormatError> {
        Ok(self
            .format_to_parts(value)?
            .iter()
            .map(|p| p.text.as_str())
            .collect())
    }

    /// Glyph used as the decimal separator in `format` output.
    fn decimal_separator(&self) -> char {
        '.'
    }
}

impl<T: PartsFormatter + ?Sized> PartsFormatter for Box<T> {
    fn format_to_parts(&self, value: f64) -> Result<Vec<NumberPart>, FormatError> {
        (**self).format_to_parts(value)
    }

    fn format(&self, value: f64) -> Result<String, FormatError> {
        (**self).format(value)
    }

    fn decimal_separator(&self) -> char {
        (**self).decimal_separator()
    }
}

/// Concatenate parts back into display text.
pub fn parts_to_string(parts: &[NumberPart]) -> String {
    parts.iter().map(|p| p.text.as_str()).collect()
}

/// Locate the decimal separator in pre-formatted text: the rightmost `sep`
/// immediately followed by an ASCII digit. Returns a char index.
pub fn locate_decimal(chars: &[char], sep: char) -> Option<usize> {
    (0..chars.len()).rev().find(|&i| {
        chars[i] == sep && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
    })
}

/// Re-derive typed parts from a plain formatted string.
///
/// Used when a formatter cannot produce parts and for externally
/// pre-formatted text. Digits left of the decimal separator are integer
/// digits, separators sitting between two integer digits are group
/// separators, digits right of it are fraction digits.
pub fn parts_from_string(text: &str, decimal_separator: char) -> Vec<NumberPart> {
    let chars: Vec<char> = text.chars().collect();
    let decimal = locate_decimal(&chars, decimal_separator);
    let in_integer = |i: usize| decimal.map_or(true, |d| i < d);

    let mut parts: Vec<NumberPart> = Vec::with_capacity(chars.len());
    for (i, &ch) in chars.iter().enumerate() {
        let kind = if ch.is_ascii_digit() {
            if in_integer(i) {
                PartKind::Integer
            } else {
                PartKind::Fraction
            }
        } else if Some(i) == decimal {
            PartKind::Decimal
        } else {
            match ch {
                '-' | '\u{2212}' => PartKind::MinusSign,
                '+' => PartKind::PlusSign,
                '%' => PartKind::PercentSign,
                _ if in_integer(i)
                    && i > 0
                    && chars[i - 1].is_ascii_digit()
                    && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) =>
                {
                    PartKind::Group
                }
                _ => PartKind::Literal,
            }
        };
        match parts.last_mut() {
            Some(last) if last.kind == kind && kind != PartKind::Group => last.text.push(ch),
            _ => parts.push(NumberPart::new(kind, ch.to_string())),
        }
    }
    parts
}
