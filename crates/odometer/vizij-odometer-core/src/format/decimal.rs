//! Built-in decimal formatter with configurable separators, grouping,
//! fraction digits, sign display, percent and currency affixes.

use serde::{Deserialize, Serialize};

use super::{FormatError, NumberPart, PartKind, PartsFormatter};

/// Mirrors the `signDisplay` option of `Intl.NumberFormat`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignDisplay {
    #[default]
    Auto,
    Always,
    Never,
    ExceptZero,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurrencyPlacement {
    #[default]
    Prefix,
    Suffix,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAffix {
    pub symbol: String,
    #[serde(default)]
    pub placement: CurrencyPlacement,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimalFormatOptions {
    pub use_grouping: bool,
    pub group_separator: char,
    pub decimal_separator: char,
    pub min_integer_digits: u8,
    pub min_fraction_digits: u8,
    pub max_fraction_digits: u8,
    pub sign_display: SignDisplay,
    /// Multiply by 100 and append a percent sign.
    pub percent: bool,
    pub currency: Option<CurrencyAffix>,
}

impl Default for DecimalFormatOptions {
    fn default() -> Self {
        Self {
            use_grouping: true,
            group_separator: ',',
            decimal_separator: '.',
            min_integer_digits: 1,
            min_fraction_digits: 0,
            max_fraction_digits: 3,
            sign_display: SignDisplay::Auto,
            percent: false,
            currency: None,
        }
    }
}

const MAX_FRACTION_DIGITS: u8 = 20;
const GROUP_SIZE: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct DecimalFormatter {
    opts: DecimalFormatOptions,
}

impl Default for DecimalFormatter {
    fn default() -> Self {
        Self {
            opts: DecimalFormatOptions::default(),
        }
    }
}

impl DecimalFormatter {
    pub fn new(opts: DecimalFormatOptions) -> Result<Self, FormatError> {
        if opts.min_fraction_digits > opts.max_fraction_digits {
            return Err(FormatError::InvalidOptions(format!(
                "min_fraction_digits ({}) exceeds max_fraction_digits ({})",
                opts.min_fraction_digits, opts.max_fraction_digits
            )));
        }
        if opts.max_fraction_digits > MAX_FRACTION_DIGITS {
            return Err(FormatError::InvalidOptions(format!(
                "max_fraction_digits must be <= {MAX_FRACTION_DIGITS}"
            )));
        }
        if opts.decimal_separator.is_ascii_digit() || opts.group_separator.is_ascii_digit() {
            return Err(FormatError::InvalidOptions(
                "separators must not be digits".into(),
            ));
        }
        Ok(Self { opts })
    }

    pub fn options(&self) -> &DecimalFormatOptions {
        &self.opts
    }

    /// Round to `max_fraction_digits`, then trim trailing zeros down to
    /// `min_fraction_digits`. Returns (integer digits, fraction digits).
    fn digits(&self, magnitude: f64) -> (String, String) {
        let rendered = format!("{:.*}", self.opts.max_fraction_digits as usize, magnitude);
        let (int, frac) = match rendered.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (rendered, String::new()),
        };
        let keep = frac
            .trim_end_matches('0')
            .len()
            .max(self.opts.min_fraction_digits as usize);
        let frac = frac[..keep].to_string();

        let min_int = self.opts.min_integer_digits as usize;
        let int = if int.len() < min_int {
            format!("{}{}", "0".repeat(min_int - int.len()), int)
        } else {
            int
        };
        (int, frac)
    }

    fn push_integer(&self, parts: &mut Vec<NumberPart>, int: &str) {
        if !self.opts.use_grouping || int.len() <= GROUP_SIZE {
            parts.push(NumberPart::new(PartKind::Integer, int));
            return;
        }
        let head = int.len() % GROUP_SIZE;
        let mut start = 0;
        if head > 0 {
            parts.push(NumberPart::new(PartKind::Integer, &int[..head]));
            start = head;
        }
        while start < int.len() {
            if start > 0 {
                parts.push(NumberPart::new(
                    PartKind::Group,
                    self.opts.group_separator.to_string(),
                ));
            }
            parts.push(NumberPart::new(
                PartKind::Integer,
                &int[start..start + GROUP_SIZE],
            ));
            start += GROUP_SIZE;
        }
    }
}

impl PartsFormatter for DecimalFormatter {
    fn format_to_parts(&self, value: f64) -> Result<Vec<NumberPart>, FormatError> {
        if !value.is_finite() {
            return Err(FormatError::NonFinite(value));
        }
        let scaled = if self.opts.percent { value * 100.0 } else { value };
        let (int, frac) = self.digits(scaled.abs());
        let is_zero = int.bytes().all(|b| b == b'0') && frac.bytes().all(|b| b == b'0');
        let negative = scaled.is_sign_negative() && !is_zero;

        let sign = match self.opts.sign_display {
            SignDisplay::Auto => negative.then_some(PartKind::MinusSign),
            SignDisplay::Always => Some(if negative {
                PartKind::MinusSign
            } else {
                PartKind::PlusSign
            }),
            SignDisplay::Never => None,
            SignDisplay::ExceptZero => (!is_zero).then_some(if negative {
                PartKind::MinusSign
            } else {
                PartKind::PlusSign
            }),
        };

        let mut parts = Vec::new();
        if let Some(kind) = sign {
            let text = if kind == PartKind::MinusSign { "-" } else { "+" };
            parts.push(NumberPart::new(kind, text));
        }
        if let Some(CurrencyAffix {
            symbol,
            placement: CurrencyPlacement::Prefix,
        }) = &self.opts.currency
        {
            parts.push(NumberPart::new(PartKind::Currency, symbol.clone()));
        }
        self.push_integer(&mut parts, &int);
        if !frac.is_empty() {
            parts.push(NumberPart::new(
                PartKind::Decimal,
                self.opts.decimal_separator.to_string(),
            ));
            parts.push(NumberPart::new(PartKind::Fraction, frac));
        }
        if self.opts.percent {
            parts.push(NumberPart::new(PartKind::PercentSign, "%"));
        }
        if let Some(CurrencyAffix {
            symbol,
            placement: CurrencyPlacement::Suffix,
        }) = &self.opts.currency
        {
            parts.push(NumberPart::new(PartKind::Literal, "\u{a0}"));
            parts.push(NumberPart::new(PartKind::Currency, symbol.clone()));
        }
        Ok(parts)
    }

    fn decimal_separator(&self) -> char {
        self.opts.decimal_separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::parts_to_string;

    fn fmt(opts: DecimalFormatOptions, v: f64) -> String {
        parts_to_string(&DecimalFormatter::new(opts).unwrap().format_to_parts(v).unwrap())
    }

    #[test]
    fn groups_and_trims_fraction() {
        let d = DecimalFormatOptions::default();
        assert_eq!(fmt(d.clone(), 1234567.5), "1,234,567.5");
        assert_eq!(fmt(d.clone(), 999.0), "999");
        assert_eq!(fmt(d.clone(), 0.0004), "0");
        assert_eq!(fmt(d, -12.3456), "-12.346");
    }

    #[test]
    fn european_separators_and_currency_suffix() {
        let opts = DecimalFormatOptions {
            group_separator: '.',
            decimal_separator: ',',
            min_fraction_digits: 2,
            max_fraction_digits: 2,
            currency: Some(CurrencyAffix {
                symbol: "€".into(),
                placement: CurrencyPlacement::Suffix,
            }),
            ..DecimalFormatOptions::default()
        };
        assert_eq!(fmt(opts, 1234.5), "1.234,50\u{a0}€");
    }

    #[test]
    fn sign_display_modes() {
        let mk = |sign_display| DecimalFormatOptions {
            sign_display,
            ..DecimalFormatOptions::default()
        };
        assert_eq!(fmt(mk(SignDisplay::Always), 5.0), "+5");
        assert_eq!(fmt(mk(SignDisplay::Always), 0.0), "+0");
        assert_eq!(fmt(mk(SignDisplay::ExceptZero), 0.0), "0");
        assert_eq!(fmt(mk(SignDisplay::ExceptZero), -2.0), "-2");
        assert_eq!(fmt(mk(SignDisplay::Never), -2.0), "2");
        // Negative values that round to zero lose their sign.
        assert_eq!(fmt(mk(SignDisplay::Auto), -0.0001), "0");
    }

    #[test]
    fn percent_and_min_integer_digits() {
        let opts = DecimalFormatOptions {
            percent: true,
            min_integer_digits: 2,
            ..DecimalFormatOptions::default()
        };
        assert_eq!(fmt(opts, 0.05), "05%");
    }

    #[test]
    fn rejects_bad_options_and_non_finite() {
        let bad = DecimalFormatOptions {
            min_fraction_digits: 4,
            max_fraction_digits: 2,
            ..DecimalFormatOptions::default()
        };
        assert!(matches!(
            DecimalFormatter::new(bad),
            Err(FormatError::InvalidOptions(_))
        ));
        let f = DecimalFormatter::default();
        assert_eq!(f.format_to_parts(f64::NAN).unwrap_err().to_string(), "cannot format non-finite value NaN");
    }
}
