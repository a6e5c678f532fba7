//! Output contracts from the odometer engine.
//!
//! Outputs carry one paintable descriptor per slot for this tick plus a list
//! of lifecycle events. Adapters (wasm, native renderers) paint the slots and
//! transport the events.

use serde::{Deserialize, Serialize};

use crate::ids::{PoolIndex, SlotKey};
use crate::keyed::CharKind;
use crate::wheel::SlotPhase;

/// Everything a host needs to paint one slot this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotFrame {
    pub key: SlotKey,
    pub pool: PoolIndex,
    pub kind: CharKind,
    #[serde(rename = "char")]
    pub ch: char,
    pub digit_value: i8,
    pub x: f32,
    pub width: f32,
    pub opacity: f32,
    /// Vertical offset of glyphs 0-9 in line heights (digits only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digit_offsets: Option<[f32; 10]>,
    pub phase: SlotPhase,
}

/// Discrete signals emitted during stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[non_exhaustive]
pub enum OdometerEvent {
    /// Aggregate "any slot animating" went false → true.
    AnimationsStart,
    /// Aggregate "any slot animating" went true → false.
    AnimationsFinish,
    /// An exiting slot finished and was dropped.
    SlotRemoved { key: SlotKey },
    /// A continuous driver released; the slot now rests on `digit`.
    DigitSettled { key: SlotKey, digit: u8 },
}

/// Outputs returned by `Odometer::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub slots: Vec<SlotFrame>,
    #[serde(default)]
    pub events: Vec<OdometerEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.slots.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_slot(&mut self, slot: SlotFrame) {
        self.slots.push(slot);
    }

    #[inline]
    pub fn push_event(&mut self, event: OdometerEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.events.is_empty()
    }

    /// Text currently shown, in slot order, ignoring exiting slots.
    pub fn visible_text(&self) -> String {
        self.slots
            .iter()
            .filter(|s| s.phase != SlotPhase::Exiting)
            .map(|s| s.ch)
            .collect()
    }
}
