//! Message contracts between the two execution contexts.
//!
//! The main context (formatting, layout, reconciliation) publishes
//! [`SlotCommand`] targets; the animation context owns all tween state and
//! answers only with [`Handoff`] summaries.

use serde::{Deserialize, Serialize};

use crate::ids::{PoolIndex, SlotKey};
use crate::layout::CharLayout;
use crate::wheel::Trend;

/// Target published by the main context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SlotCommand {
    /// A slot appears. `entering == false` for the initial mount (no fade).
    Mount {
        layout: CharLayout,
        pool: PoolIndex,
        entering: bool,
    },
    /// New discrete target for an existing slot (digit, glyph, x, width).
    Retarget { layout: CharLayout },
    /// Snap x / width without touching the wheel (scrub width release).
    Place { layout: CharLayout },
    /// Continuous-driver frame for an existing slot; `digit` < 0 means inactive.
    Continuous { layout: CharLayout, digit: i8 },
    /// The continuous driver went idle for this slot.
    ContinuousIdle { key: SlotKey },
    /// Slot left the layout; fade out and roll to zero.
    Exit { key: SlotKey },
    /// A still-exiting slot came back into the layout.
    Revive { layout: CharLayout },
    /// Remove immediately without animation (pool pressure, reset).
    Forget { key: SlotKey },
    SetTrend { trend: Trend },
}

/// Summary relayed back from the animation context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handoff {
    EnterComplete { key: SlotKey },
    ExitComplete { key: SlotKey },
    /// Committed digit of a slot at the moment its continuous driver released.
    EffectiveDigit { key: SlotKey, digit: u8 },
}
