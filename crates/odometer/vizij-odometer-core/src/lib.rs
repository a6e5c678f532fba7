//! Vizij Odometer Core (renderer-agnostic)
//!
//! Rolling-digit text: a value is formatted into stably keyed characters,
//! laid out against a glyph metrics table, reconciled against the previous
//! row and animated per slot (cyclic digit wheels, fades, reflow). Hosts feed
//! values and frame deltas to [`Odometer`] and paint the returned
//! [`SlotFrame`]s.

pub mod animator;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod keyed;
pub mod layout;
pub mod metrics;
pub mod outputs;
pub mod reconcile;
pub mod scrub;
pub mod wheel;

// Re-exports for consumers (adapters)
pub use animator::Animator;
pub use config::{Config, ScrubConfig};
pub use engine::Odometer;
pub use error::{OdometerError, Result};
pub use format::{
    DecimalFormatOptions, DecimalFormatter, FormatError, NumberPart, PartKind, PartsFormatter,
    TimeFormatOptions, TimeFormatter, TimeValue,
};
pub use ids::{KeyRegion, PoolIndex, SlotKey};
pub use inputs::{Handoff, SlotCommand};
pub use interp::{AnimatedValue, Easing, Timing};
pub use keyed::{format_keyed, key_literal, key_parts, key_text, CharKind, KeyedPart};
pub use layout::{layout_literal, layout_parts, Alignment, CharLayout, DigitWidthMode, LayoutParams};
pub use metrics::{GlyphMeasurer, GlyphMetrics, MetricsCache};
pub use outputs::{OdometerEvent, Outputs, SlotFrame};
pub use reconcile::{Reconciliation, SlotReconciler, SlotStatus};
pub use scrub::ScrubWidths;
pub use wheel::{compute_roll_delta, glyph_offsets, DigitWheel, SlotPhase, Trend};
