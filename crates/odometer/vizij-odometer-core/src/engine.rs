//! Odometer: main-context ownership of value, formatter, metrics and slot
//! identity, driving the animation context through [`SlotCommand`]s.
//!
//! Methods:
//! - new, set_value / set_time / set_text, set_prefix / set_suffix / set_affixes,
//!   set_container, set_trend, set_metrics, set_formatter, drive_continuous
//! - update (tick animations → consume handoffs → emit frames and events)

use std::fmt;

use hashbrown::{HashMap, HashSet};
use log::{debug, warn};

use crate::animator::Animator;
use crate::config::Config;
use crate::error::{OdometerError, Result};
use crate::format::{PartsFormatter, TimeValue};
use crate::ids::{PoolIndex, SlotKey, SlotPool};
use crate::inputs::{Handoff, SlotCommand};
use crate::keyed::{format_keyed, key_text};
use crate::layout::{layout_literal, layout_parts_with, Alignment, CharLayout, LayoutParams};
use crate::metrics::GlyphMetrics;
use crate::outputs::{OdometerEvent, Outputs};
use crate::reconcile::{Reconciliation, SlotReconciler};
use crate::scrub::ScrubWidths;
use crate::wheel::Trend;

/// What the discrete path renders.
#[derive(Clone, Debug, PartialEq)]
enum Source {
    Empty,
    Value(f64),
    /// Externally pre-formatted text.
    Text(String),
}

pub struct Odometer {
    cfg: Config,
    formatter: Box<dyn PartsFormatter>,
    metrics: GlyphMetrics,

    // Discrete source and decorations
    source: Source,
    prefix: String,
    suffix: String,
    container_width: f32,

    // Continuous driver text while active
    continuous: Option<String>,

    // Slot identity
    reconciler: SlotReconciler,
    applied_generation: u64,
    pool: SlotPool,
    pools: HashMap<SlotKey, PoolIndex>,
    effective: HashMap<SlotKey, u8>,

    // Animation context
    animator: Animator,
    scrub: ScrubWidths,
    animating: bool,

    // Per-tick outputs
    pending_events: Vec<OdometerEvent>,
    outputs: Outputs,
}

impl fmt::Debug for Odometer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Odometer")
            .field("cfg", &self.cfg)
            .field("source", &self.source)
            .field("continuous", &self.continuous)
            .field("live_slots", &self.pools.len())
            .field("animating", &self.animating)
            .finish_non_exhaustive()
    }
}

impl Odometer {
    /// Create an odometer. Nothing is shown until a value or text is set.
    pub fn new(
        cfg: Config,
        formatter: Box<dyn PartsFormatter>,
        metrics: GlyphMetrics,
    ) -> Result<Self> {
        cfg.validate()?;
        metrics.validate()?;
        Ok(Self {
            pool: SlotPool::new(cfg.max_slots),
            animator: Animator::new(&cfg),
            scrub: ScrubWidths::new(&metrics, cfg.scrub),
            formatter,
            metrics,
            source: Source::Empty,
            prefix: String::new(),
            suffix: String::new(),
            container_width: 0.0,
            continuous: None,
            reconciler: SlotReconciler::new(),
            applied_generation: 0,
            pools: HashMap::new(),
            effective: HashMap::new(),
            animating: false,
            pending_events: Vec::new(),
            outputs: Outputs::default(),
            cfg,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn metrics(&self) -> &GlyphMetrics {
        &self.metrics
    }

    /// Outputs produced by the last `update`.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Aggregate "any slot animating" as of the last `update`.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Whether a continuous driver currently owns the layout.
    pub fn is_continuous(&self) -> bool {
        self.continuous.is_some()
    }

    /// Current reconciliation: layout order followed by exiting slots.
    pub fn layout(&self) -> &Reconciliation {
        self.reconciler.current()
    }

    /// Slots holding a pool entry (present plus still exiting).
    pub fn live_slots(&self) -> usize {
        self.pools.len()
    }

    /// Digit a slot settled on when its continuous driver last released.
    pub fn effective_digit(&self, key: &SlotKey) -> Option<u8> {
        self.effective.get(key).copied()
    }

    /// Show a numeric value through the installed formatter. On pool overflow
    /// the previous value stays on screen.
    pub fn set_value(&mut self, value: f64) -> Result<()> {
        self.set_source(Source::Value(value))
    }

    /// Show a time of day / duration; equivalent to `set_value` in seconds.
    pub fn set_time(&mut self, time: TimeValue) -> Result<()> {
        self.set_value(time.total_seconds())
    }

    /// Show externally pre-formatted text.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.set_source(Source::Text(text.to_string()))
    }

    fn set_source(&mut self, source: Source) -> Result<()> {
        let prev = std::mem::replace(&mut self.source, source);
        self.relayout(false).inspect_err(|_| self.source = prev)
    }

    pub fn set_prefix(&mut self, prefix: &str) -> Result<()> {
        let suffix = self.suffix.clone();
        self.set_affixes(prefix, &suffix)
    }

    pub fn set_suffix(&mut self, suffix: &str) -> Result<()> {
        let prefix = self.prefix.clone();
        self.set_affixes(&prefix, suffix)
    }

    pub fn set_affixes(&mut self, prefix: &str, suffix: &str) -> Result<()> {
        let prev_prefix = std::mem::replace(&mut self.prefix, prefix.to_string());
        let prev_suffix = std::mem::replace(&mut self.suffix, suffix.to_string());
        self.relayout(false).inspect_err(|_| {
            self.prefix = prev_prefix;
            self.suffix = prev_suffix;
        })
    }

    /// Container width / alignment signal from the host view.
    pub fn set_container(&mut self, width: f32, alignment: Alignment) -> Result<()> {
        self.container_width = width.max(0.0);
        self.cfg.alignment = alignment;
        self.relayout(false)
    }

    pub fn set_trend(&mut self, trend: Trend) {
        self.cfg.trend = trend;
        self.animator.apply(SlotCommand::SetTrend { trend });
    }

    /// Toggle animation; when off, every new tween resolves on the next tick.
    pub fn set_animated(&mut self, animated: bool) {
        self.cfg.animated = animated;
        self.animator.configure(&self.cfg);
    }

    /// Swap the glyph table (font change). Positions re-flow with a tween.
    pub fn set_metrics(&mut self, metrics: GlyphMetrics) -> Result<()> {
        metrics.validate()?;
        self.scrub.set_metrics(&metrics);
        self.metrics = metrics;
        self.relayout(false)
    }

    pub fn set_formatter(&mut self, formatter: Box<dyn PartsFormatter>) -> Result<()> {
        self.formatter = formatter;
        self.relayout(false)
    }

    /// Separator assumed when keying pre-formatted and continuous text.
    pub fn set_decimal_separator(&mut self, separator: char) -> Result<()> {
        self.cfg.decimal_separator = separator;
        self.relayout(false)
    }

    /// Feed the continuous driver's current text; empty text means idle.
    ///
    /// While active the driver's text replaces the discrete source, digit
    /// widths are forced to the scrub width and wheels accumulate. Going idle
    /// releases every wheel and re-renders the discrete source.
    pub fn drive_continuous(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            if self.continuous.take().is_none() {
                return Ok(());
            }
            self.scrub.drive("", &self.metrics, self.cfg.digit_width);
            let idle: Vec<SlotCommand> = self
                .reconciler
                .previous()
                .filter(|slot| slot.digit().is_some())
                .map(|slot| SlotCommand::ContinuousIdle { key: slot.key })
                .collect();
            self.animator.apply_all(idle);
            debug!("odometer: continuous driver idle");
            return self.relayout(false);
        }

        let prev_scrub = self.scrub.clone();
        self.scrub.drive(text, &self.metrics, self.cfg.digit_width);
        let prev = self.continuous.replace(text.to_string());
        self.relayout(false).inspect_err(|_| {
            self.continuous = prev;
            self.scrub = prev_scrub;
        })
    }

    fn build_layout(&self) -> Option<Vec<CharLayout>> {
        let params = LayoutParams {
            metrics: &self.metrics,
            container_width: self.container_width,
            alignment: self.cfg.alignment,
            digit_width: self.cfg.digit_width,
        };
        // Scrub widths are recorded per driver-text position.
        let overrides = self.scrub.shifted(self.prefix.chars().count());
        if let Some(text) = self.continuous.as_deref() {
            return Some(layout_literal(
                text,
                self.cfg.decimal_separator,
                &self.prefix,
                &self.suffix,
                &params,
                &overrides,
            ));
        }
        let parts = match &self.source {
            Source::Empty => return None,
            Source::Value(value) => {
                format_keyed(&*self.formatter, *value, &self.prefix, &self.suffix)
            }
            Source::Text(text) => {
                key_text(text, self.cfg.decimal_separator, &self.prefix, &self.suffix)
            }
        };
        Some(layout_parts_with(&parts, &params, &overrides))
    }

    /// Format, lay out and reconcile, then publish targets to the animator.
    /// `snap` places continuing slots without a position tween.
    fn relayout(&mut self, snap: bool) -> Result<()> {
        let Some(layout) = self.build_layout() else {
            return Ok(());
        };
        if layout.len() > self.cfg.max_slots {
            warn!(
                "odometer: layout of {} characters exceeds pool of {}",
                layout.len(),
                self.cfg.max_slots
            );
            return Err(OdometerError::SlotPoolOverflow {
                requested: layout.len(),
                max: self.cfg.max_slots,
            });
        }

        let rec = self.reconciler.reconcile(&layout);
        let changed = rec.generation != self.applied_generation;
        self.applied_generation = rec.generation;
        let entering: HashSet<SlotKey> = rec.entering.iter().copied().collect();
        let (departed, revived): (Vec<SlotKey>, HashSet<SlotKey>) = if changed {
            (rec.departed.clone(), rec.revived.iter().copied().collect())
        } else {
            (Vec::new(), HashSet::new())
        };

        let mut cmds: Vec<SlotCommand> = departed
            .into_iter()
            .map(|key| SlotCommand::Exit { key })
            .collect();
        let continuous = self.continuous.is_some();
        for slot in layout {
            let key = slot.key;
            if !self.pools.contains_key(&key) {
                let pool = self.acquire_pool(key, &mut cmds)?;
                cmds.push(SlotCommand::Mount {
                    layout: slot,
                    pool,
                    entering: entering.contains(&key),
                });
            } else if revived.contains(&key) {
                cmds.push(SlotCommand::Revive { layout: slot });
            } else if continuous {
                let digit = slot.digit_value;
                cmds.push(SlotCommand::Continuous { layout: slot, digit });
            } else if snap {
                cmds.push(SlotCommand::Place { layout: slot });
            } else {
                cmds.push(SlotCommand::Retarget { layout: slot });
            }
        }
        self.animator.apply_all(cmds);
        Ok(())
    }

    /// Reserve a pool entry, finalizing the oldest exiting slots under pressure.
    fn acquire_pool(&mut self, key: SlotKey, cmds: &mut Vec<SlotCommand>) -> Result<PoolIndex> {
        loop {
            if let Some(idx) = self.pool.alloc() {
                self.pools.insert(key, idx);
                return Ok(idx);
            }
            let Some(oldest) = self.reconciler.oldest_exiting() else {
                return Err(OdometerError::SlotPoolOverflow {
                    requested: self.pools.len() + 1,
                    max: self.cfg.max_slots,
                });
            };
            debug!("odometer: pool full, dropping exiting slot {oldest}");
            cmds.push(SlotCommand::Forget { key: oldest });
            self.remove_slot(oldest);
        }
    }

    fn remove_slot(&mut self, key: SlotKey) {
        self.reconciler.finish_exit(&key);
        if let Some(idx) = self.pools.remove(&key) {
            self.pool.release(idx);
        }
        self.effective.remove(&key);
        self.pending_events.push(OdometerEvent::SlotRemoved { key });
    }

    /// Advance every animation by `dt_ms` and return this tick's outputs.
    pub fn update(&mut self, dt_ms: f32) -> &Outputs {
        self.outputs.clear();
        self.outputs.events.append(&mut self.pending_events);

        let settling = self.scrub.is_animating();
        if settling && !self.animating {
            self.set_animating(true);
        }
        self.scrub.tick(dt_ms);
        if settling {
            if let Err(err) = self.relayout(true) {
                warn!("odometer: scrub release relayout failed: {err}");
            }
        }

        if self.animator.is_animating() && !self.animating {
            self.set_animating(true);
        }
        self.animator.tick(dt_ms);
        for handoff in self.animator.drain_handoffs() {
            match handoff {
                Handoff::EnterComplete { key } => debug!("odometer: slot {key} entered"),
                Handoff::ExitComplete { key } => {
                    if self.reconciler.is_exiting(&key) {
                        self.remove_slot(key);
                    }
                }
                Handoff::EffectiveDigit { key, digit } => {
                    self.effective.insert(key, digit);
                    self.pending_events
                        .push(OdometerEvent::DigitSettled { key, digit });
                }
            }
        }
        self.outputs.events.append(&mut self.pending_events);

        let still = self.animator.is_animating() || self.scrub.is_animating();
        if !still && self.animating {
            self.set_animating(false);
        }

        for slot in &self.reconciler.current().slots {
            if let Some(frame) = self.animator.frame(&slot.layout.key) {
                self.outputs.push_slot(frame);
            }
        }
        &self.outputs
    }

    fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
        self.outputs.push_event(if animating {
            OdometerEvent::AnimationsStart
        } else {
            OdometerEvent::AnimationsFinish
        });
    }
}
