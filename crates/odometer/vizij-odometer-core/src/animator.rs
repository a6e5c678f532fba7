//! Animation context: owns per-slot tween state and consumes main-context
//! targets. It never touches main-context state; summaries go back through
//! the handoff queue.

use std::collections::VecDeque;

use hashbrown::HashMap;
use log::{debug, warn};

use crate::config::Config;
use crate::ids::{PoolIndex, SlotKey};
use crate::inputs::{Handoff, SlotCommand};
use crate::interp::{AnimatedValue, Timing};
use crate::keyed::CharKind;
use crate::layout::CharLayout;
use crate::outputs::SlotFrame;
use crate::wheel::{DigitWheel, SlotPhase, Trend};

#[derive(Clone, Debug)]
struct SlotAnimation {
    key: SlotKey,
    pool: PoolIndex,
    phase: SlotPhase,
    kind: CharKind,
    ch: char,
    digit_value: i8,
    wheel: Option<DigitWheel>,
    x: AnimatedValue,
    width: AnimatedValue,
    opacity: AnimatedValue,
}

impl SlotAnimation {
    fn is_animating(&self) -> bool {
        self.x.is_animating()
            || self.width.is_animating()
            || self.opacity.is_animating()
            || self.wheel.as_ref().is_some_and(|w| w.is_animating())
    }

    fn advance(&mut self, next: SlotPhase) -> bool {
        if self.phase.can_advance_to(next) {
            self.phase = next;
            true
        } else {
            false
        }
    }

    fn adopt(&mut self, layout: &CharLayout) {
        self.kind = layout.kind;
        self.ch = layout.ch;
        self.digit_value = layout.digit_value;
    }
}

#[derive(Copy, Clone, Debug)]
struct Timings {
    digit: Timing,
    opacity: Timing,
    transform: Timing,
    glyph_clamp: f32,
}

impl Timings {
    fn from_config(cfg: &Config) -> Self {
        Self {
            digit: cfg.effective(cfg.digit_timing),
            opacity: cfg.effective(cfg.opacity_timing),
            transform: cfg.effective(cfg.transform_timing),
            glyph_clamp: cfg.glyph_clamp,
        }
    }
}

#[derive(Debug)]
pub struct Animator {
    timings: Timings,
    trend: Trend,
    slots: HashMap<SlotKey, SlotAnimation>,
    handoffs: VecDeque<Handoff>,
}

impl Animator {
    pub fn new(cfg: &Config) -> Self {
        Self {
            timings: Timings::from_config(cfg),
            trend: cfg.trend,
            slots: HashMap::new(),
            handoffs: VecDeque::new(),
        }
    }

    /// Pick up new timings; running tweens keep their original timing.
    pub fn configure(&mut self, cfg: &Config) {
        self.timings = Timings::from_config(cfg);
        self.trend = cfg.trend;
    }

    pub fn apply_all<I: IntoIterator<Item = SlotCommand>>(&mut self, cmds: I) {
        for cmd in cmds {
            self.apply(cmd);
        }
    }

    pub fn apply(&mut self, cmd: SlotCommand) {
        let t = self.timings;
        let trend = self.trend;
        match cmd {
            SlotCommand::Mount {
                layout,
                pool,
                entering,
            } => {
                let wheel = layout.digit().map(|d| {
                    if entering {
                        let mut w = DigitWheel::new(0);
                        w.commit(d, trend, t.digit);
                        w
                    } else {
                        DigitWheel::new(d)
                    }
                });
                let mut opacity = AnimatedValue::new(1.0);
                if entering {
                    opacity.animate_from(0.0, 1.0, t.opacity);
                }
                self.slots.insert(
                    layout.key,
                    SlotAnimation {
                        key: layout.key,
                        pool,
                        phase: if entering {
                            SlotPhase::Entering
                        } else {
                            SlotPhase::Active
                        },
                        kind: layout.kind,
                        ch: layout.ch,
                        digit_value: layout.digit_value,
                        wheel,
                        x: AnimatedValue::new(layout.x),
                        width: AnimatedValue::new(layout.width),
                        opacity,
                    },
                );
            }
            SlotCommand::Retarget { layout } => {
                let Some(slot) = self.slots.get_mut(&layout.key) else {
                    warn!("odometer animator: retarget for unknown slot {}", layout.key);
                    return;
                };
                if slot.phase == SlotPhase::Exiting {
                    return;
                }
                slot.x.animate_to(layout.x, t.transform);
                slot.width.animate_to(layout.width, t.transform);
                match layout.digit() {
                    Some(d) => match slot.wheel.as_mut() {
                        Some(wheel) => {
                            if wheel.commit(d, trend, t.digit).is_none() {
                                // Continuous driver owns the wheel.
                                return;
                            }
                        }
                        None => slot.wheel = Some(DigitWheel::new(d)),
                    },
                    None => slot.wheel = None,
                }
                slot.adopt(&layout);
            }
            SlotCommand::Place { layout } => {
                if let Some(slot) = self
                    .slots
                    .get_mut(&layout.key)
                    .filter(|s| s.phase != SlotPhase::Exiting)
                {
                    slot.x.jump(layout.x);
                    slot.width.jump(layout.width);
                }
            }
            SlotCommand::Continuous { layout, digit } => {
                let Some(slot) = self.slots.get_mut(&layout.key) else {
                    return;
                };
                if slot.phase == SlotPhase::Exiting {
                    return;
                }
                slot.x.jump(layout.x);
                slot.width.jump(layout.width);
                match layout.digit() {
                    Some(d) => {
                        let wheel = slot.wheel.get_or_insert_with(|| DigitWheel::new(d));
                        wheel.push_continuous(digit, trend, t.digit);
                    }
                    None => slot.wheel = None,
                }
                slot.adopt(&layout);
            }
            SlotCommand::ContinuousIdle { key } => {
                if let Some(wheel) = self
                    .slots
                    .get_mut(&key)
                    .and_then(|s| s.wheel.as_mut())
                    .filter(|w| w.is_continuous())
                {
                    let digit = wheel.release_continuous();
                    self.handoffs.push_back(Handoff::EffectiveDigit { key, digit });
                }
            }
            SlotCommand::Exit { key } => {
                let Some(slot) = self.slots.get_mut(&key) else {
                    return;
                };
                if !slot.advance(SlotPhase::Exiting) {
                    return;
                }
                slot.opacity.animate_to(0.0, t.opacity);
                if let Some(wheel) = slot.wheel.as_mut() {
                    wheel.roll_to_zero(trend, t.digit);
                }
            }
            SlotCommand::Revive { layout } => {
                let Some(old) = self.slots.remove(&layout.key) else {
                    warn!("odometer animator: revive for unknown slot {}", layout.key);
                    return;
                };
                // Exiting is terminal: the returning slot is a fresh entering
                // slot that starts from the old one's visual state.
                let mut slot = SlotAnimation {
                    phase: SlotPhase::Entering,
                    ..old
                };
                slot.opacity.animate_to(1.0, t.opacity);
                slot.x.animate_to(layout.x, t.transform);
                slot.width.animate_to(layout.width, t.transform);
                slot.wheel = match (layout.digit(), slot.wheel.take()) {
                    (Some(d), Some(mut wheel)) => {
                        wheel.accumulate_to(d, trend, t.digit);
                        Some(wheel)
                    }
                    (Some(d), None) => Some(DigitWheel::new(d)),
                    (None, _) => None,
                };
                slot.adopt(&layout);
                self.slots.insert(layout.key, slot);
            }
            SlotCommand::Forget { key } => {
                self.slots.remove(&key);
            }
            SlotCommand::SetTrend { trend } => self.trend = trend,
        }
    }

    /// Advance every slot by `dt_ms` and queue completion handoffs.
    pub fn tick(&mut self, dt_ms: f32) {
        let mut finished: Vec<Handoff> = Vec::new();
        for slot in self.slots.values_mut() {
            slot.x.tick(dt_ms);
            slot.width.tick(dt_ms);
            if let Some(wheel) = slot.wheel.as_mut() {
                wheel.tick(dt_ms);
            }
            slot.opacity.tick(dt_ms);
            if slot.opacity.is_animating() {
                continue;
            }
            match slot.phase {
                SlotPhase::Entering => {
                    slot.advance(SlotPhase::Active);
                    finished.push(Handoff::EnterComplete { key: slot.key });
                }
                SlotPhase::Exiting => finished.push(Handoff::ExitComplete { key: slot.key }),
                SlotPhase::Active => {}
            }
        }
        finished.sort_by_key(|h| match h {
            Handoff::EnterComplete { key }
            | Handoff::ExitComplete { key }
            | Handoff::EffectiveDigit { key, .. } => *key,
        });
        for handoff in finished {
            if let Handoff::ExitComplete { key } = &handoff {
                self.slots.remove(key);
                debug!("odometer animator: slot {key} exit complete");
            }
            self.handoffs.push_back(handoff);
        }
    }

    pub fn drain_handoffs(&mut self) -> Vec<Handoff> {
        self.handoffs.drain(..).collect()
    }

    pub fn is_animating(&self) -> bool {
        self.slots.values().any(SlotAnimation::is_animating)
    }

    pub fn frame(&self, key: &SlotKey) -> Option<SlotFrame> {
        let slot = self.slots.get(key)?;
        let (ch, digit_value) = match &slot.wheel {
            Some(wheel) => {
                let d = wheel.current_digit();
                (char::from(b'0' + d), d as i8)
            }
            None => (slot.ch, slot.digit_value),
        };
        Some(SlotFrame {
            key: slot.key,
            pool: slot.pool,
            kind: slot.kind,
            ch,
            digit_value,
            x: slot.x.value(),
            width: slot.width.value(),
            opacity: slot.opacity.value(),
            digit_offsets: slot
                .wheel
                .as_ref()
                .map(|w| w.glyph_offsets(self.timings.glyph_clamp)),
            phase: slot.phase,
        })
    }

    pub fn phase(&self, key: &SlotKey) -> Option<SlotPhase> {
        self.slots.get(key).map(|s| s.phase)
    }

    pub fn wheel(&self, key: &SlotKey) -> Option<&DigitWheel> {
        self.slots.get(key).and_then(|s| s.wheel.as_ref())
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.handoffs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::KeyRegion;
    use crate::interp::Easing;

    fn cfg() -> Config {
        Config {
            digit_timing: Timing::new(100.0, Easing::Linear),
            opacity_timing: Timing::new(100.0, Easing::Linear),
            transform_timing: Timing::new(100.0, Easing::Linear),
            ..Config::default()
        }
    }

    fn digit(index: u32, d: u8, x: f32) -> CharLayout {
        CharLayout {
            key: SlotKey::new(KeyRegion::Integer, index),
            kind: CharKind::Digit,
            ch: char::from(b'0' + d),
            digit_value: d as i8,
            x,
            width: 10.0,
        }
    }

    #[test]
    fn entering_slot_fades_in_then_activates() {
        let mut a = Animator::new(&cfg());
        let layout = digit(1, 1, 0.0);
        let key = layout.key;
        a.apply(SlotCommand::Mount {
            layout,
            pool: PoolIndex(0),
            entering: true,
        });
        assert_eq!(a.phase(&key), Some(SlotPhase::Entering));
        assert_eq!(a.frame(&key).unwrap().opacity, 0.0);
        a.tick(50.0);
        assert!(a.drain_handoffs().is_empty());
        a.tick(50.0);
        assert_eq!(a.phase(&key), Some(SlotPhase::Active));
        assert_eq!(a.drain_handoffs(), vec![Handoff::EnterComplete { key }]);
        assert_eq!(a.wheel(&key).unwrap().visible_digit(), 1);
    }

    #[test]
    fn exit_fades_rolls_to_zero_and_reports() {
        let mut a = Animator::new(&cfg());
        let layout = digit(0, 7, 0.0);
        let key = layout.key;
        a.apply(SlotCommand::Mount {
            layout,
            pool: PoolIndex(0),
            entering: false,
        });
        a.apply(SlotCommand::Exit { key });
        assert_eq!(a.phase(&key), Some(SlotPhase::Exiting));
        // Exiting is terminal; retargets are ignored.
        a.apply(SlotCommand::Retarget { layout: digit(0, 2, 0.0) });
        a.tick(100.0);
        assert_eq!(a.drain_handoffs(), vec![Handoff::ExitComplete { key }]);
        assert!(!a.contains(&key));
    }

    #[test]
    fn zero_duration_exit_resolves_on_next_tick() {
        let mut a = Animator::new(&Config {
            animated: false,
            ..Config::default()
        });
        let layout = digit(0, 3, 0.0);
        let key = layout.key;
        a.apply(SlotCommand::Mount {
            layout,
            pool: PoolIndex(0),
            entering: false,
        });
        a.apply(SlotCommand::Exit { key });
        a.tick(0.0);
        assert_eq!(a.drain_handoffs(), vec![Handoff::ExitComplete { key }]);
    }

    #[test]
    fn continuous_idle_hands_back_effective_digit() {
        let mut a = Animator::new(&cfg());
        let layout = digit(0, 2, 0.0);
        let key = layout.key;
        a.apply(SlotCommand::Mount {
            layout,
            pool: PoolIndex(0),
            entering: false,
        });
        a.apply(SlotCommand::Continuous {
            layout: digit(0, 6, 0.0),
            digit: 6,
        });
        // Discrete retarget is suppressed while the driver is active.
        a.apply(SlotCommand::Retarget { layout: digit(0, 9, 0.0) });
        assert_eq!(a.wheel(&key).unwrap().current_digit(), 6);
        a.apply(SlotCommand::ContinuousIdle { key });
        assert_eq!(
            a.drain_handoffs(),
            vec![Handoff::EffectiveDigit { key, digit: 6 }]
        );
        a.apply(SlotCommand::Retarget { layout: digit(0, 9, 0.0) });
        assert_eq!(a.wheel(&key).unwrap().current_digit(), 9);
    }

    #[test]
    fn revive_starts_from_current_visual_state() {
        let mut a = Animator::new(&cfg());
        let layout = digit(0, 4, 0.0);
        let key = layout.key;
        a.apply(SlotCommand::Mount {
            layout: layout.clone(),
            pool: PoolIndex(3),
            entering: false,
        });
        a.apply(SlotCommand::Exit { key });
        a.tick(50.0);
        let faded = a.frame(&key).unwrap().opacity;
        a.apply(SlotCommand::Revive { layout });
        let frame = a.frame(&key).unwrap();
        assert_eq!(frame.phase, SlotPhase::Entering);
        assert_eq!(frame.opacity, faded);
        assert_eq!(frame.pool, PoolIndex(3));
        a.tick(100.0);
        assert_eq!(a.phase(&key), Some(SlotPhase::Active));
        assert_eq!(a.wheel(&key).unwrap().visible_digit(), 4);
    }
}
