//! Clock / duration formatting (`h:mm:ss`, optional 12-hour day period).

use serde::{Deserialize, Serialize};

use super::{FormatError, NumberPart, PartKind, PartsFormatter};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeValue {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimeValue {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Split whole seconds into h/m/s; fractional seconds are truncated.
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: (total / 3600).min(u32::MAX as u64) as u32,
            minutes: ((total / 60) % 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn total_seconds(&self) -> f64 {
        self.hours as f64 * 3600.0 + self.minutes as f64 * 60.0 + self.seconds as f64
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HourCycle {
    /// Hours are shown as-is (durations, 24h clocks).
    #[default]
    H24,
    /// Hours wrap to 1..=12 and a day period is appended.
    H12,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeFormatOptions {
    pub hour_cycle: HourCycle,
    pub show_hours: bool,
    pub show_seconds: bool,
    /// Pad hours to two digits.
    pub pad_hours: bool,
}

impl Default for TimeFormatOptions {
    fn default() -> Self {
        Self {
            hour_cycle: HourCycle::H24,
            show_hours: true,
            show_seconds: true,
            pad_hours: false,
        }
    }
}

/// Formats a value in seconds as a clock. Time digits are emitted as
/// hour / minute / second parts so each unit is keyed from its ones place.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeFormatter {
    opts: TimeFormatOptions,
}

impl TimeFormatter {
    pub fn new(opts: TimeFormatOptions) -> Self {
        Self { opts }
    }

    pub fn format_time(&self, t: TimeValue) -> Vec<NumberPart> {
        let mut parts = Vec::with_capacity(7);
        // Folded hours can exceed u32 minutes.
        let mut minutes = u64::from(t.minutes);
        if self.opts.show_hours {
            let hours = match self.opts.hour_cycle {
                HourCycle::H24 => t.hours,
                HourCycle::H12 => match t.hours % 12 {
                    0 => 12,
                    h => h,
                },
            };
            let text = if self.opts.pad_hours {
                format!("{hours:02}")
            } else {
                hours.to_string()
            };
            parts.push(NumberPart::new(PartKind::Hour, text));
            parts.push(NumberPart::new(PartKind::Literal, ":"));
        } else {
            minutes += u64::from(t.hours) * 60;
        }
        parts.push(NumberPart::new(PartKind::Minute, format!("{minutes:02}")));
        if self.opts.show_seconds {
            parts.push(NumberPart::new(PartKind::Literal, ":"));
            parts.push(NumberPart::new(PartKind::Second, format!("{:02}", t.seconds)));
        }
        if self.opts.hour_cycle == HourCycle::H12 {
            let period = if t.hours % 24 < 12 { "AM" } else { "PM" };
            parts.push(NumberPart::new(PartKind::Literal, " "));
            parts.push(NumberPart::new(PartKind::DayPeriod, period));
        }
        parts
    }
}

impl PartsFormatter for TimeFormatter {
    fn format_to_parts(&self, value: f64) -> Result<Vec<NumberPart>, FormatError> {
        if !value.is_finite() {
            return Err(FormatError::NonFinite(value));
        }
        let mut parts = Vec::new();
        if value < 0.0 && value.abs() >= 1.0 {
            parts.push(NumberPart::new(PartKind::MinusSign, "-"));
        }
        parts.extend(self.format_time(TimeValue::from_seconds(value.abs().floor() as u64)));
        Ok(parts)
    }
}
