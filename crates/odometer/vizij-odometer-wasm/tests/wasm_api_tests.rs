#![cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Object, Reflect};
use serde_json::json;
use vizij_odometer_wasm::{abi_version, VizijOdometer};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mono_metrics() -> JsValue {
    let metrics = json!({
        "char_widths": {},
        "max_digit_width": 8.0,
        "line_height": 16.0,
        "default_width": 8.0
    });
    JsValue::from_str(&metrics.to_string())
}

fn get(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(&Object::from(obj.clone()), &JsValue::from_str(key)).unwrap()
}

fn visible_text(outputs: &JsValue) -> String {
    let slots = Array::from(&get(outputs, "slots"));
    let mut text = String::new();
    for i in 0..slots.length() {
        let slot = slots.get(i);
        if get(&slot, "phase").as_string().as_deref() == Some("exiting") {
            continue;
        }
        text.push_str(&get(&slot, "char").as_string().unwrap());
    }
    text
}

fn event_types(outputs: &JsValue) -> Vec<String> {
    let events = Array::from(&get(outputs, "events"));
    (0..events.length())
        .filter_map(|i| get(&events.get(i), "type").as_string())
        .collect()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(VizijOdometer::new(JsValue::UNDEFINED, JsValue::NULL).is_ok());
}

#[wasm_bindgen_test]
fn rejects_invalid_config() {
    let cfg = JsValue::from_str(&json!({ "max_slots": 0 }).to_string());
    assert!(VizijOdometer::new(cfg, mono_metrics()).is_err());
}

#[wasm_bindgen_test]
fn value_change_rolls_and_settles() {
    let cfg = JsValue::from_str(r#"{ "animated": true }"#);
    let mut od = VizijOdometer::new(cfg, mono_metrics()).unwrap();
    od.set_container(120.0, JsValue::from_str("end")).unwrap();
    od.set_value(9.0).unwrap();
    let first = od.update(0.0).unwrap();
    assert_eq!(visible_text(&first), "9");

    od.set_value(10.0).unwrap();
    let out = od.update(16.0).unwrap();
    assert!(event_types(&out).contains(&"animationsStart".to_string()));
    assert!(od.is_animating());

    let mut last = out;
    for _ in 0..200 {
        last = od.update(16.0).unwrap();
        if !od.is_animating() {
            break;
        }
    }
    assert_eq!(visible_text(&last), "10");
    assert!(event_types(&last).contains(&"animationsFinish".to_string()));
}

#[wasm_bindgen_test]
fn host_formatter_parts_are_keyed() {
    let mut od = VizijOdometer::new(JsValue::NULL, mono_metrics()).unwrap();
    od.set_animated(false);
    let f = Function::new_with_args(
        "v",
        "return [{ type: 'currency', value: '€' }, { type: 'integer', value: String(Math.trunc(v)) }];",
    );
    od.set_formatter(f, None).unwrap();
    od.set_value(42.0).unwrap();
    let out = od.update(0.0).unwrap();
    assert_eq!(visible_text(&out), "€42");
}

#[wasm_bindgen_test]
fn host_formatter_string_falls_back_to_rescan() {
    let mut od = VizijOdometer::new(JsValue::NULL, mono_metrics()).unwrap();
    od.set_animated(false);
    let f = Function::new_with_args("v", "return v.toFixed(1).replace('.', ',');");
    od.set_formatter(f, Some(",".into())).unwrap();
    od.set_value(3.5).unwrap();
    let out = od.update(0.0).unwrap();
    assert_eq!(visible_text(&out), "3,5");
}

#[wasm_bindgen_test]
fn built_in_format_options_and_affixes() {
    let mut od = VizijOdometer::new(JsValue::NULL, mono_metrics()).unwrap();
    od.set_animated(false);
    let opts = JsValue::from_str(&json!({ "kind": "decimal", "max_fraction_digits": 2 }).to_string());
    od.set_format_options(opts).unwrap();
    od.set_affixes("$".into(), "".into()).unwrap();
    od.set_value(1234.567).unwrap();
    let out = od.update(0.0).unwrap();
    assert_eq!(visible_text(&out), "$1,234.57");

    let bad = JsValue::from_str(r#"{ "kind": "roman" }"#);
    assert!(od.set_format_options(bad).is_err());
}

#[wasm_bindgen_test]
fn continuous_driver_round_trip() {
    let mut od = VizijOdometer::new(JsValue::NULL, mono_metrics()).unwrap();
    od.set_animated(false);
    od.set_value(12.5).unwrap();
    od.update(0.0).unwrap();

    od.drive_continuous("13.7".into()).unwrap();
    let out = od.update(16.0).unwrap();
    assert_eq!(visible_text(&out), "13.7");

    od.drive_continuous("".into()).unwrap();
    let out = od.update(0.0).unwrap();
    assert!(event_types(&out).contains(&"digitSettled".to_string()));
}
