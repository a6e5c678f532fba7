//! Keyed formatter: value → ordered, stably keyed character descriptors.
//!
//! Integer digits and group separators (and each time unit) are numbered from
//! the right, so the ones place is always `integer:0` and growing 9 → 10 only
//! introduces a new leading slot. Every other region is numbered from the left.

use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::format::{locate_decimal, parts_from_string, FormatError, NumberPart, PartKind, PartsFormatter};
use crate::ids::{KeyRegion, SlotKey};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharKind {
    Digit,
    Symbol,
}

/// One character of the formatted row with its stable identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedPart {
    pub key: SlotKey,
    pub kind: CharKind,
    #[serde(rename = "char")]
    pub ch: char,
    /// 0-9 for digits, -1 for symbols.
    pub digit_value: i8,
}

impl KeyedPart {
    pub fn digit(key: SlotKey, value: u8) -> Self {
        debug_assert!(value <= 9);
        Self {
            key,
            kind: CharKind::Digit,
            ch: char::from(b'0' + value),
            digit_value: value as i8,
        }
    }

    pub fn symbol(key: SlotKey, ch: char) -> Self {
        Self {
            key,
            kind: CharKind::Symbol,
            ch,
            digit_value: -1,
        }
    }

    #[inline]
    pub fn is_digit(&self) -> bool {
        self.kind == CharKind::Digit
    }
}

fn region_for(kind: PartKind) -> KeyRegion {
    match kind {
        PartKind::Integer => KeyRegion::Integer,
        PartKind::Group => KeyRegion::Group,
        PartKind::Decimal => KeyRegion::Decimal,
        PartKind::Fraction => KeyRegion::Fraction,
        PartKind::MinusSign => KeyRegion::MinusSign,
        PartKind::PlusSign => KeyRegion::PlusSign,
        PartKind::PercentSign => KeyRegion::PercentSign,
        PartKind::Currency => KeyRegion::Currency,
        PartKind::Compact => KeyRegion::Compact,
        PartKind::Hour => KeyRegion::Hours,
        PartKind::Minute => KeyRegion::Minutes,
        PartKind::Second => KeyRegion::Seconds,
        PartKind::DayPeriod => KeyRegion::DayPeriod,
        PartKind::Literal => KeyRegion::Literal,
    }
}

/// Regions whose ASCII digits roll on a wheel.
fn is_numeric_region(region: KeyRegion) -> bool {
    matches!(
        region,
        KeyRegion::Integer
            | KeyRegion::Fraction
            | KeyRegion::Hours
            | KeyRegion::Minutes
            | KeyRegion::Seconds
    )
}

fn describe(region: KeyRegion, index: u32, ch: char) -> KeyedPart {
    let key = SlotKey::new(region, index);
    match ch.to_digit(10) {
        Some(d) if is_numeric_region(region) && ch.is_ascii_digit() => KeyedPart::digit(key, d as u8),
        _ => KeyedPart::symbol(key, ch),
    }
}

/// Assign keys to already-tagged characters.
fn assign_keys(chars: &[(KeyRegion, char)]) -> Vec<KeyedPart> {
    let mut indices: Vec<u32> = vec![0; chars.len()];
    let mut counters: HashMap<KeyRegion, u32> = HashMap::new();

    for (i, (region, _)) in chars.iter().enumerate() {
        if !region.keyed_right_to_left() {
            let n = counters.entry(*region).or_insert(0);
            indices[i] = *n;
            *n += 1;
        }
    }
    for (i, (region, _)) in chars.iter().enumerate().rev() {
        if region.keyed_right_to_left() {
            let n = counters.entry(*region).or_insert(0);
            indices[i] = *n;
            *n += 1;
        }
    }

    chars
        .iter()
        .zip(indices)
        .map(|((region, ch), index)| describe(*region, index, *ch))
        .collect()
}

/// Flatten formatter parts plus prefix / suffix into keyed characters.
pub fn key_parts(parts: &[NumberPart], prefix: &str, suffix: &str) -> Vec<KeyedPart> {
    let mut chars: Vec<(KeyRegion, char)> = Vec::new();
    chars.extend(prefix.chars().map(|c| (KeyRegion::Prefix, c)));
    for part in parts {
        let region = region_for(part.kind);
        chars.extend(part.text.chars().map(|c| (region, c)));
    }
    chars.extend(suffix.chars().map(|c| (KeyRegion::Suffix, c)));
    assign_keys(&chars)
}

/// Format `value` and key the result. Never fails: a formatter that cannot
/// produce parts is re-scanned from its plain output, and any other failure
/// yields an empty row.
pub fn format_keyed<F: PartsFormatter + ?Sized>(
    formatter: &F,
    value: f64,
    prefix: &str,
    suffix: &str,
) -> Vec<KeyedPart> {
    let parts = match formatter.format_to_parts(value) {
        Ok(parts) => parts,
        Err(FormatError::Unsupported) => match formatter.format(value) {
            Ok(text) => parts_from_string(&text, formatter.decimal_separator()),
            Err(err) => {
                warn!("odometer: plain formatting of {value} failed: {err}");
                return Vec::new();
            }
        },
        Err(err) => {
            warn!("odometer: formatting {value} to parts failed: {err}");
            return Vec::new();
        }
    };
    key_parts(&parts, prefix, suffix)
}

/// Key externally pre-formatted text (discrete path, no formatter involved).
pub fn key_text(text: &str, decimal_separator: char, prefix: &str, suffix: &str) -> Vec<KeyedPart> {
    key_parts(&parts_from_string(text, decimal_separator), prefix, suffix)
}

/// Key a raw literal string positionally, for continuous drivers that hand
/// over text without part identities. Prefix and suffix are keyed exactly as
/// on the discrete path so decoration slots persist across a drive.
///
/// With a decimal point present, integer digits are numbered from the right
/// (matching [`key_parts`]); without one, every character is numbered left to
/// right in scan order.
pub fn key_literal(text: &str, decimal_separator: char, prefix: &str, suffix: &str) -> Vec<KeyedPart> {
    let chars: Vec<char> = text.chars().collect();
    if locate_decimal(&chars, decimal_separator).is_some() {
        return key_text(text, decimal_separator, prefix, suffix);
    }
    let tagged = prefix
        .chars()
        .map(|c| (KeyRegion::Prefix, c))
        .chain(chars.iter().map(|&c| {
            let region = match c {
                _ if c.is_ascii_digit() => KeyRegion::Integer,
                '-' | '\u{2212}' => KeyRegion::MinusSign,
                '+' => KeyRegion::PlusSign,
                _ => KeyRegion::Literal,
            };
            (region, c)
        }))
        .chain(suffix.chars().map(|c| (KeyRegion::Suffix, c)));

    let mut counters: HashMap<KeyRegion, u32> = HashMap::new();
    tagged
        .map(|(region, c)| {
            let n = counters.entry(region).or_insert(0);
            let part = describe(region, *n, c);
            *n += 1;
            part
        })
        .collect()
}
