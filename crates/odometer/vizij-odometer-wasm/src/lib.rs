use js_sys::Function;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_odometer_core::{
    format::parts_to_string, Alignment, Config, DecimalFormatOptions, DecimalFormatter,
    FormatError, GlyphMetrics, NumberPart, Odometer, OdometerError, Outputs, PartsFormatter,
    TimeFormatOptions, TimeFormatter, Trend,
};

#[wasm_bindgen]
pub struct VizijOdometer {
    core: Odometer,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn core_err(e: OdometerError) -> JsError {
    JsError::new(&e.to_string())
}

/// Accept either a JS object or a JSON string.
fn from_js<T: DeserializeOwned>(v: JsValue, what: &str) -> Result<T, JsError> {
    if let Some(s) = v.as_string() {
        return serde_json::from_str(&s).map_err(|e| JsError::new(&format!("{what} error: {e}")));
    }
    swb::from_value(v).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

/// Built-in formatter selection, e.g. `{ kind: "decimal", max_fraction_digits: 2 }`.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum FormatOptions {
    Decimal(DecimalFormatOptions),
    Time(TimeFormatOptions),
}

/// Host formatter callback: `(value: number) => Part[] | string`, where a part
/// is `{ type, value }` as produced by `Intl.NumberFormat#formatToParts`.
/// Returning a plain string routes through the text re-scan fallback.
struct JsFormatter {
    f: Function,
    decimal_separator: char,
}

impl JsFormatter {
    fn call(&self, value: f64) -> Result<JsValue, FormatError> {
        self.f
            .call1(&JsValue::UNDEFINED, &JsValue::from_f64(value))
            .map_err(|e| FormatError::Host(format!("{e:?}")))
    }
}

impl PartsFormatter for JsFormatter {
    fn format_to_parts(&self, value: f64) -> Result<Vec<NumberPart>, FormatError> {
        let out = self.call(value)?;
        if out.is_string() {
            return Err(FormatError::Unsupported);
        }
        swb::from_value(out).map_err(|e| FormatError::Host(e.to_string()))
    }

    fn format(&self, value: f64) -> Result<String, FormatError> {
        let out = self.call(value)?;
        if let Some(s) = out.as_string() {
            return Ok(s);
        }
        let parts: Vec<NumberPart> =
            swb::from_value(out).map_err(|e| FormatError::Host(e.to_string()))?;
        Ok(parts_to_string(&parts))
    }

    fn decimal_separator(&self) -> char {
        self.decimal_separator
    }
}

#[wasm_bindgen]
impl VizijOdometer {
    /// Create an odometer. `config` is an optional (partial) Config object;
    /// `metrics` an optional GlyphMetrics table (defaults to a 10px monospace).
    /// Example:
    ///   new VizijOdometer({ max_slots: 12, trend: "up" }, metrics)
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, metrics: JsValue) -> Result<VizijOdometer, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            from_js(config, "config")?
        };
        let metrics: GlyphMetrics = if jsvalue_is_undefined_or_null(&metrics) {
            GlyphMetrics::monospace(10.0, 20.0)
        } else {
            from_js(metrics, "metrics")?
        };
        let core = Odometer::new(cfg, Box::new(DecimalFormatter::default()), metrics)
            .map_err(core_err)?;
        Ok(VizijOdometer { core })
    }

    /// Replace the glyph width table (e.g. after a font change).
    #[wasm_bindgen(js_name = set_metrics)]
    pub fn set_metrics(&mut self, metrics: JsValue) -> Result<(), JsError> {
        let metrics: GlyphMetrics = from_js(metrics, "metrics")?;
        self.core.set_metrics(metrics).map_err(core_err)
    }

    /// Switch to a built-in formatter.
    #[wasm_bindgen(js_name = set_format_options)]
    pub fn set_format_options(&mut self, options: JsValue) -> Result<(), JsError> {
        let formatter: Box<dyn PartsFormatter> = match from_js(options, "format options")? {
            FormatOptions::Decimal(opts) => Box::new(
                DecimalFormatter::new(opts)
                    .map_err(|e| JsError::new(&format!("format options error: {e}")))?,
            ),
            FormatOptions::Time(opts) => Box::new(TimeFormatter::new(opts)),
        };
        let separator = formatter.decimal_separator();
        self.core.set_decimal_separator(separator).map_err(core_err)?;
        self.core.set_formatter(formatter).map_err(core_err)
    }

    /// Install a host formatter callback (see `JsFormatter`). `decimal_separator`
    /// is the glyph its plain-string output uses, "." when omitted.
    #[wasm_bindgen(js_name = set_formatter)]
    pub fn set_formatter(
        &mut self,
        formatter: Function,
        decimal_separator: Option<String>,
    ) -> Result<(), JsError> {
        let decimal_separator = decimal_separator
            .and_then(|s| s.chars().next())
            .unwrap_or('.');
        self.core
            .set_decimal_separator(decimal_separator)
            .map_err(core_err)?;
        self.core
            .set_formatter(Box::new(JsFormatter {
                f: formatter,
                decimal_separator,
            }))
            .map_err(core_err)
    }

    #[wasm_bindgen(js_name = set_value)]
    pub fn set_value(&mut self, value: f64) -> Result<(), JsError> {
        self.core.set_value(value).map_err(core_err)
    }

    /// Show externally pre-formatted text.
    #[wasm_bindgen(js_name = set_text)]
    pub fn set_text(&mut self, text: String) -> Result<(), JsError> {
        self.core.set_text(&text).map_err(core_err)
    }

    /// Continuous driver frame; pass "" when the driver goes idle.
    #[wasm_bindgen(js_name = drive_continuous)]
    pub fn drive_continuous(&mut self, text: String) -> Result<(), JsError> {
        self.core.drive_continuous(&text).map_err(core_err)
    }

    /// Container width in px and alignment ("start" | "center" | "end").
    /// Alignment is kept when omitted.
    #[wasm_bindgen(js_name = set_container)]
    pub fn set_container(&mut self, width: f32, alignment: JsValue) -> Result<(), JsError> {
        let alignment: Alignment = if jsvalue_is_undefined_or_null(&alignment) {
            self.core.config().alignment
        } else {
            swb::from_value(alignment).map_err(|e| JsError::new(&format!("alignment error: {e}")))?
        };
        self.core.set_container(width, alignment).map_err(core_err)
    }

    #[wasm_bindgen(js_name = set_affixes)]
    pub fn set_affixes(&mut self, prefix: String, suffix: String) -> Result<(), JsError> {
        self.core.set_affixes(&prefix, &suffix).map_err(core_err)
    }

    /// Roll direction by sign: > 0 up, < 0 down, 0 shortest path.
    #[wasm_bindgen(js_name = set_trend)]
    pub fn set_trend(&mut self, trend: i32) {
        self.core.set_trend(Trend::from(trend));
    }

    #[wasm_bindgen(js_name = set_animated)]
    pub fn set_animated(&mut self, animated: bool) {
        self.core.set_animated(animated);
    }

    #[wasm_bindgen(js_name = is_animating)]
    pub fn is_animating(&self) -> bool {
        self.core.is_animating()
    }

    /// Step animations by dt (milliseconds). Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f32) -> Result<JsValue, JsError> {
        let out: &Outputs = self.core.update(dt);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
