use serde::Deserialize;
use vizij_odometer_core::{
    format::parts_from_string, key_parts, layout_parts, Alignment, GlyphMetrics, KeyRegion,
    LayoutParams, NumberPart, SlotKey,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartsFixture {
    decimal_separator: char,
    cases: Vec<PartsCase>,
}

#[derive(Debug, Deserialize)]
struct PartsCase {
    value: f64,
    text: String,
    parts: Vec<NumberPart>,
}

fn load(name: &str) -> PartsFixture {
    vizij_test_fixtures::parts::load(name).unwrap_or_else(|e| panic!("load {name}: {e:#}"))
}

fn keys(parts: &[NumberPart]) -> Vec<String> {
    key_parts(parts, "", "")
        .iter()
        .map(|p| p.key.to_string())
        .collect()
}

#[test]
fn every_parts_fixture_concatenates_to_its_text() {
    for name in vizij_test_fixtures::parts::keys() {
        let fixture = load(&name);
        assert!(!fixture.cases.is_empty(), "{name} has no cases");
        for case in &fixture.cases {
            let joined: String = case.parts.iter().map(|p| p.text.as_str()).collect();
            assert_eq!(joined, case.text, "{name} @ {}", case.value);
            let keyed = key_parts(&case.parts, "", "");
            assert_eq!(keyed.len(), case.text.chars().count());
        }
    }
}

#[test]
fn en_us_nine_to_ten_keeps_ones_place() {
    let fixture = load("en-US");
    let nine = fixture.cases.iter().find(|c| c.value == 9.0).expect("9 case");
    let ten = fixture.cases.iter().find(|c| c.value == 10.0).expect("10 case");
    assert_eq!(keys(&nine.parts), vec!["integer:0"]);
    assert_eq!(keys(&ten.parts), vec!["integer:1", "integer:0"]);
}

#[test]
fn en_us_negative_grouped_value_is_keyed_per_region() {
    let fixture = load("en-US");
    let case = fixture.cases.iter().find(|c| c.value < 0.0).expect("negative case");
    assert_eq!(
        keys(&case.parts),
        vec![
            "minusSign:0",
            "integer:3",
            "group:0",
            "integer:2",
            "integer:1",
            "integer:0",
            "decimal:0",
            "fraction:0",
        ]
    );
}

#[test]
fn rescanned_text_matches_recorded_numeric_keys() {
    // A degraded formatter only yields text; the numeric skeleton must key the
    // same way as the recorded parts.
    for name in ["de-DE-currency", "fr-FR", "en-US"] {
        let fixture = load(name);
        for case in &fixture.cases {
            let numeric = |parts: &[NumberPart]| -> Vec<SlotKey> {
                key_parts(parts, "", "")
                    .into_iter()
                    .map(|p| p.key)
                    .filter(|k| {
                        matches!(
                            k.region,
                            KeyRegion::Integer
                                | KeyRegion::Group
                                | KeyRegion::Decimal
                                | KeyRegion::Fraction
                        )
                    })
                    .collect()
            };
            let rescanned = parts_from_string(&case.text, fixture.decimal_separator);
            assert_eq!(
                numeric(&rescanned),
                numeric(&case.parts),
                "{name} @ {}",
                case.value
            );
        }
    }
}

#[test]
fn de_de_separators_are_not_confused() {
    let fixture = load("de-DE-currency");
    assert_eq!(fixture.decimal_separator, ',');
    let case = &fixture.cases[0];
    let parts = parts_from_string(&case.text, ',');
    let keyed = key_parts(&parts, "", "");
    let dot = keyed.iter().find(|p| p.ch == '.').expect("group dot");
    assert_eq!(dot.key, SlotKey::new(KeyRegion::Group, 0));
    let comma = keyed.iter().find(|p| p.ch == ',').expect("decimal comma");
    assert_eq!(comma.key, SlotKey::new(KeyRegion::Decimal, 0));
}

#[test]
fn fr_fr_layout_uses_measured_narrow_space() {
    let metrics: GlyphMetrics = vizij_test_fixtures::metrics::load("inter-16").expect("inter-16");
    let fixture = load("fr-FR");
    let case = fixture
        .cases
        .iter()
        .find(|c| c.value > 1000.0)
        .expect("grouped case");
    let keyed = key_parts(&case.parts, "", "");
    let layout = layout_parts(&keyed, &LayoutParams::new(&metrics, 0.0, Alignment::Start));
    let group = layout
        .iter()
        .find(|c| c.key.region == KeyRegion::Group)
        .expect("group slot");
    assert_eq!(group.width, metrics.width_of('\u{202f}'));
    assert!(group.width < metrics.max_digit_width);
}
