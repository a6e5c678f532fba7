//! Stable slot keys and the fixed slot pool.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logical region a character was produced from. Counters are kept per region.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyRegion {
    Prefix,
    Integer,
    Group,
    Decimal,
    Fraction,
    MinusSign,
    PlusSign,
    PercentSign,
    Currency,
    Compact,
    Literal,
    Hours,
    Minutes,
    Seconds,
    DayPeriod,
    Suffix,
}

impl KeyRegion {
    const ALL: [KeyRegion; 16] = [
        KeyRegion::Prefix,
        KeyRegion::Integer,
        KeyRegion::Group,
        KeyRegion::Decimal,
        KeyRegion::Fraction,
        KeyRegion::MinusSign,
        KeyRegion::PlusSign,
        KeyRegion::PercentSign,
        KeyRegion::Currency,
        KeyRegion::Compact,
        KeyRegion::Literal,
        KeyRegion::Hours,
        KeyRegion::Minutes,
        KeyRegion::Seconds,
        KeyRegion::DayPeriod,
        KeyRegion::Suffix,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Integer => "integer",
            Self::Group => "group",
            Self::Decimal => "decimal",
            Self::Fraction => "fraction",
            Self::MinusSign => "minusSign",
            Self::PlusSign => "plusSign",
            Self::PercentSign => "percentSign",
            Self::Currency => "currency",
            Self::Compact => "compact",
            Self::Literal => "literal",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
            Self::DayPeriod => "dayPeriod",
            Self::Suffix => "suffix",
        }
    }

    /// Regions numbered from the right so that growing a number keeps the
    /// identity of its low-order places.
    #[inline]
    pub fn keyed_right_to_left(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Group | Self::Hours | Self::Minutes | Self::Seconds
        )
    }
}

/// Identity of a slot across renders, e.g. `integer:0` for the ones place.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SlotKey {
    pub region: KeyRegion,
    pub index: u32,
}

impl SlotKey {
    #[inline]
    pub const fn new(region: KeyRegion, index: u32) -> Self {
        Self { region, index }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region.name(), self.index)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid slot key '{0}'")]
pub struct ParseSlotKeyError(pub String);

impl FromStr for SlotKey {
    type Err = ParseSlotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (region, index) = s
            .split_once(':')
            .ok_or_else(|| ParseSlotKeyError(s.to_string()))?;
        let region = KeyRegion::ALL
            .iter()
            .copied()
            .find(|r| r.name() == region)
            .ok_or_else(|| ParseSlotKeyError(s.to_string()))?;
        let index = index
            .parse::<u32>()
            .map_err(|_| ParseSlotKeyError(s.to_string()))?;
        Ok(Self { region, index })
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for SlotKey {
    type Error = ParseSlotKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Physical slot in the fixed pool a host pre-allocates glyph nodes for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PoolIndex(pub u16);

/// Fixed-capacity allocator for pool indices. Lowest free index first, so
/// hosts see dense indices.
#[derive(Debug, Clone)]
pub struct SlotPool {
    in_use: Vec<bool>,
}

impl SlotPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            in_use: vec![false; capacity.min(u16::MAX as usize)],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.in_use.len()
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.in_use.iter().filter(|used| !**used).count()
    }

    #[inline]
    pub fn alloc(&mut self) -> Option<PoolIndex> {
        let idx = self.in_use.iter().position(|used| !*used)?;
        self.in_use[idx] = true;
        Some(PoolIndex(idx as u16))
    }

    #[inline]
    pub fn release(&mut self, idx: PoolIndex) {
        if let Some(slot) = self.in_use.get_mut(idx.0 as usize) {
            *slot = false;
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.in_use.iter_mut().for_each(|used| *used = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_and_parse() {
        let key = SlotKey::new(KeyRegion::Integer, 0);
        assert_eq!(key.to_string(), "integer:0");
        assert_eq!("minusSign:2".parse::<SlotKey>().unwrap(), SlotKey::new(KeyRegion::MinusSign, 2));
        assert!("integer".parse::<SlotKey>().is_err());
        assert!("bogus:1".parse::<SlotKey>().is_err());
    }

    #[test]
    fn key_serializes_as_string() {
        let key = SlotKey::new(KeyRegion::Fraction, 3);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"fraction:3\"");
        let back: SlotKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn pool_reuses_lowest_free_index() {
        let mut pool = SlotPool::new(3);
        assert_eq!(pool.alloc(), Some(PoolIndex(0)));
        assert_eq!(pool.alloc(), Some(PoolIndex(1)));
        assert_eq!(pool.alloc(), Some(PoolIndex(2)));
        assert_eq!(pool.alloc(), None);
        pool.release(PoolIndex(1));
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.alloc(), Some(PoolIndex(1)));
        pool.reset();
        assert_eq!(pool.available(), 3);
    }
}
