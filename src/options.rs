//! Construction options, as accepted from the JS options object.
//!
//! Keys follow the JS naming (`flakeCount`, `roofSelector`, ...). Every key is
//! optional. Which region selectors are present picks the [`Preset`].
//!
//! Parsing never fails: a value of the wrong shape is logged and replaced by
//! its default, the way a plain JS object with odd values would still work.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::stage::FlakeFactors;

pub const DEFAULT_ROOF_SELECTOR: &str = ".snowdom-roof";
pub const DEFAULT_PILE_SELECTOR: &str = ".snowdom-pile";

/// Night tint drawn under everything when piles are enabled.
pub const BACKGROUND_WASH: &str = "rgba(24,48,110,0.1)";
pub const ROOF_DEBUG_FILL: &str = "red";
pub const ROOF_FILL: &str = "transparent";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// No regions; just falling flakes.
    Plain,
    Roof,
    /// Piles plus the night background wash.
    Pile,
}

impl Preset {
    pub fn default_flake_count(self) -> usize {
        match self {
            Preset::Plain | Preset::Roof => 1000,
            Preset::Pile => 3000,
        }
    }

    pub fn background_wash(self) -> Option<&'static str> {
        match self {
            Preset::Pile => Some(BACKGROUND_WASH),
            Preset::Plain | Preset::Roof => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnowOptions {
    /// Falls back to the preset's count when absent.
    pub flake_count: Option<usize>,
    pub flake_size: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub roof_selector: Option<String>,
    pub pile_selector: Option<String>,
    pub debug: bool,
}

impl Default for SnowOptions {
    fn default() -> Self {
        Self {
            flake_count: None,
            flake_size: 1.0,
            velocity_x: 1.0,
            velocity_y: 1.0,
            roof_selector: Some(DEFAULT_ROOF_SELECTOR.to_string()),
            pile_selector: None,
            debug: false,
        }
    }
}

/// Options object as sent from JS. `None` means the key was absent,
/// `Some(Value::Null)` that it was `null` (or `NaN`/`Infinity` before
/// `JSON.stringify`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    #[serde(default, deserialize_with = "present")]
    flake_count: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    flake_size: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    velocity_x: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    velocity_y: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    roof_selector: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pile_selector: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    debug: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(de).map(Some)
}

fn number(key: &str, value: Option<Value>) -> Option<f64> {
    match value? {
        Value::Null => None,
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        other => {
            log::warn!("ignoring option {key}: expected a number, got {other}");
            None
        }
    }
}

fn selector(key: &str, value: Option<Value>, default: Option<&str>) -> Option<String> {
    match value {
        None => default.map(str::to_string),
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            log::warn!("ignoring option {key}: expected a selector string, got {other}");
            default.map(str::to_string)
        }
    }
}

/// JS truthiness of a JSON value.
fn truthy(value: Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

impl From<RawOptions> for SnowOptions {
    fn from(raw: RawOptions) -> Self {
        let defaults = Self::default();
        Self {
            // A loop of `i < flakeCount` in JS: fractions round up, negatives give none.
            flake_count: number("flakeCount", raw.flake_count).map(|n| n.max(0.0).ceil() as usize),
            flake_size: number("flakeSize", raw.flake_size).unwrap_or(defaults.flake_size),
            velocity_x: number("velocityX", raw.velocity_x).unwrap_or(defaults.velocity_x),
            velocity_y: number("velocityY", raw.velocity_y).unwrap_or(defaults.velocity_y),
            roof_selector: selector(
                "roofSelector",
                raw.roof_selector,
                Some(DEFAULT_ROOF_SELECTOR),
            ),
            pile_selector: selector("pileSelector", raw.pile_selector, None),
            debug: truthy(raw.debug),
        }
    }
}

impl SnowOptions {
    /// Reads a JSON options object. `null`, the empty string, and anything
    /// that is not an object give the defaults.
    pub fn from_json(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == "null" {
            return Self::default();
        }
        match serde_json::from_str::<RawOptions>(text) {
            Ok(raw) => raw.into(),
            Err(err) => {
                log::warn!("ignoring snow options, using defaults: {err}");
                Self::default()
            }
        }
    }

    pub fn preset(&self) -> Preset {
        if self.pile_selector.is_some() {
            Preset::Pile
        } else if self.roof_selector.is_some() {
            Preset::Roof
        } else {
            Preset::Plain
        }
    }

    pub fn flake_count(&self) -> usize {
        self.flake_count.unwrap_or_else(|| self.preset().default_flake_count())
    }

    /// Per-flake multipliers. Size and fall speed cannot go negative; wind
    /// may blow either way.
    pub fn flake_factors(&self) -> FlakeFactors {
        FlakeFactors {
            size: finite_or(self.flake_size, 1.0).max(0.0),
            velocity_x: finite_or(self.velocity_x, 1.0),
            velocity_y: finite_or(self.velocity_y, 1.0).max(0.0),
        }
    }

    pub fn roof_fill(&self) -> &'static str {
        if self.debug { ROOF_DEBUG_FILL } else { ROOF_FILL }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
