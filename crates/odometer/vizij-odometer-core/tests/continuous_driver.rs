use approx::assert_abs_diff_eq;
use vizij_odometer_core::{
    scrub::scrub_digit_width, Alignment, CharKind, Config, DecimalFormatter, DigitWidthMode,
    Easing, GlyphMetrics, KeyRegion, Odometer, OdometerEvent, Outputs, SlotKey, SlotPhase, Timing,
};

const LINEAR_100: Timing = Timing::new(100.0, Easing::Linear);

fn metrics() -> GlyphMetrics {
    vizij_test_fixtures::metrics::load("inter-16").expect("load inter-16 metrics")
}

fn odometer() -> Odometer {
    let cfg = Config {
        digit_timing: LINEAR_100,
        opacity_timing: LINEAR_100,
        transform_timing: LINEAR_100,
        digit_width: DigitWidthMode::Proportional,
        ..Config::default()
    };
    let mut o = Odometer::new(cfg, Box::new(DecimalFormatter::default()), metrics())
        .expect("valid odometer");
    o.set_container(200.0, Alignment::End).unwrap();
    o
}

fn digit_widths(out: &Outputs) -> Vec<f32> {
    out.slots
        .iter()
        .filter(|s| s.kind == CharKind::Digit)
        .map(|s| s.width)
        .collect()
}

fn settled(out: &Outputs) -> Vec<(SlotKey, u8)> {
    out.events
        .iter()
        .filter_map(|e| match e {
            OdometerEvent::DigitSettled { key, digit } => Some((*key, *digit)),
            _ => None,
        })
        .collect()
}

#[test]
fn driver_forces_uniform_width_then_releases() {
    let m = metrics();
    let mut o = odometer();
    o.set_value(12.5).unwrap();
    let rest = o.update(0.0).clone();
    assert_ne!(digit_widths(&rest)[0], digit_widths(&rest)[1]);

    o.drive_continuous("12.5").unwrap();
    let forced = o.update(16.0).clone();
    let scrub = scrub_digit_width(&m, 0.75);
    assert!(digit_widths(&forced).iter().all(|w| (*w - scrub).abs() < 1e-4));
    // Symbols keep their measured width.
    let point = forced.slots.iter().find(|s| s.ch == '.').unwrap();
    assert_eq!(point.width, m.width_of('.'));

    o.drive_continuous("").unwrap();
    let releasing = o.update(100.0).clone();
    let one = releasing.slots.iter().find(|s| s.ch == '1').unwrap();
    assert!(one.width < scrub && one.width > m.digit_width(1));

    o.update(150.0);
    let done = o.update(16.0).clone();
    let widths = digit_widths(&done);
    assert_abs_diff_eq!(widths[0], m.digit_width(1), epsilon = 1e-4);
    assert_abs_diff_eq!(widths[1], m.digit_width(2), epsilon = 1e-4);
    assert_abs_diff_eq!(widths[2], m.digit_width(5), epsilon = 1e-4);
    assert!(!o.is_animating());
}

#[test]
fn driver_suppresses_discrete_updates_and_hands_back_digits() {
    let mut o = odometer();
    o.set_value(12.5).unwrap();
    o.update(0.0);

    o.drive_continuous("13.7").unwrap();
    o.update(16.0);
    o.drive_continuous("19.9").unwrap();
    assert!(o.is_continuous());

    // A discrete value change while scrubbing does not take over.
    o.set_value(50.0).unwrap();
    let out = o.update(200.0).clone();
    assert_eq!(out.visible_text(), "19.9");

    o.drive_continuous("").unwrap();
    assert!(!o.is_continuous());
    let out = o.update(0.0).clone();
    let ones = SlotKey::new(KeyRegion::Integer, 0);
    let tens = SlotKey::new(KeyRegion::Integer, 1);
    let tenths = SlotKey::new(KeyRegion::Fraction, 0);
    assert_eq!(settled(&out), vec![(tens, 1), (ones, 9), (tenths, 9)]);
    assert_eq!(o.effective_digit(&ones), Some(9));

    // The discrete value is rendered once the driver is idle.
    let out = o.update(300.0).clone();
    assert_eq!(out.visible_text(), "50");
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, OdometerEvent::SlotRemoved { key } if *key == tenths)));
}

#[test]
fn idle_without_active_driver_is_a_no_op() {
    let mut o = odometer();
    o.set_value(7.0).unwrap();
    o.update(0.0);
    o.drive_continuous("").unwrap();
    let out = o.update(16.0);
    assert!(out.events.is_empty());
    assert_eq!(out.visible_text(), "7");
}

fn removed(out: &Outputs) -> Vec<SlotKey> {
    out.events
        .iter()
        .filter_map(|e| match e {
            OdometerEvent::SlotRemoved { key } => Some(*key),
            _ => None,
        })
        .collect()
}

#[test]
fn release_with_prefix_eases_each_digit_to_its_own_width() {
    let m = metrics();
    let prefix_key = SlotKey::new(KeyRegion::Prefix, 0);
    let mut o = odometer();
    o.set_prefix("$").unwrap();
    o.set_value(12.0).unwrap();
    o.update(0.0);

    o.drive_continuous("12").unwrap();
    let driving = o.update(16.0).clone();
    assert_eq!(driving.visible_text(), "$12");
    let prefix = driving.slots.iter().find(|s| s.key == prefix_key).unwrap();
    assert_eq!(prefix.phase, SlotPhase::Active);
    assert_eq!(prefix.opacity, 1.0);

    o.drive_continuous("").unwrap();
    let releasing = o.update(100.0).clone();
    let scrub = scrub_digit_width(&m, 0.75);
    let one = releasing.slots.iter().find(|s| s.ch == '1').unwrap();
    let two = releasing.slots.iter().find(|s| s.ch == '2').unwrap();
    assert!(one.width < scrub && one.width > m.digit_width(1), "'1' width {}", one.width);
    assert!(two.width <= scrub && two.width > m.digit_width(2) + 1e-3, "'2' width {}", two.width);

    let tail = o.update(150.0).clone();
    let done = o.update(16.0).clone();
    for out in [&driving, &releasing, &tail, &done] {
        assert!(!removed(out).contains(&prefix_key));
    }
    let widths = digit_widths(&done);
    assert_abs_diff_eq!(widths[0], m.digit_width(1), epsilon = 1e-4);
    assert_abs_diff_eq!(widths[1], m.digit_width(2), epsilon = 1e-4);
    assert_eq!(done.visible_text(), "$12");
    assert!(!o.is_animating());
}

#[test]
fn decimal_less_drive_keys_left_to_right_then_hands_back() {
    let ones = SlotKey::new(KeyRegion::Integer, 0);
    let tens = SlotKey::new(KeyRegion::Integer, 1);
    let mut o = odometer();
    o.set_value(12.0).unwrap();
    let rest = o.update(0.0).clone();
    let slot = |out: &Outputs, key: SlotKey| out.slots.iter().find(|s| s.key == key).cloned().unwrap();
    assert_eq!(slot(&rest, ones).ch, '2');
    assert!(slot(&rest, ones).x > slot(&rest, tens).x);

    // Without a decimal point the driver text is keyed in scan order.
    o.drive_continuous("12").unwrap();
    let driving = o.update(200.0).clone();
    assert_eq!(driving.visible_text(), "12");
    assert_eq!(slot(&driving, ones).ch, '1');
    assert!(slot(&driving, ones).x < slot(&driving, tens).x);

    o.drive_continuous("").unwrap();
    let out = o.update(0.0).clone();
    let handed_back = settled(&out);
    assert!(handed_back.contains(&(ones, 1)));
    assert!(handed_back.contains(&(tens, 2)));

    o.update(300.0);
    let done = o.update(16.0).clone();
    assert_eq!(done.visible_text(), "12");
    assert_eq!(slot(&done, ones).ch, '2');
    assert!(slot(&done, ones).x > slot(&done, tens).x);
    assert!(removed(&done).is_empty());
    assert_eq!(o.live_slots(), 2);
}
