//! Ratio, unit, and boolean conversion for relay setting values.
//!
//! Every function here is total: malformed input yields `None` (or a
//! field-level `None` inside the result), never a panic or an error. The
//! zero-secondary case of a ratio is an explicit unknown, not infinity.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "1500:5", "1500/5", "13800V/120V"
    static ref RATIO: Regex =
        Regex::new(r"^(\d+(?:\.\d+)?)\s*[Vv]?\s*[:/]\s*(\d+(?:\.\d+)?)\s*[Vv]?$").unwrap();

    // "0.63 In", "1500 A", "2.00 Ien"
    static ref SCALAR_WITH_UNIT: Regex =
        Regex::new(r"^(\d+(?:\.\d+)?)\s*([A-Za-z]+)$").unwrap();

    // "13800V", "13.80 kV"
    static ref VOLTAGE: Regex =
        Regex::new(r"^(\d+(?:\.\d+)?)\s*([kK]?)[Vv]$").unwrap();
}

/// A parsed `primary:secondary` ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioParts {
    pub primary: f64,
    pub secondary: f64,
    /// `primary / secondary`; `None` when the secondary is zero.
    pub ratio: Option<f64>,
}

/// Parse a ratio string of the form `<number>[:/]<number>`.
///
/// A zero secondary yields `ratio: None` rather than infinity.
pub fn parse_ratio(text: &str) -> Option<RatioParts> {
    let caps = RATIO.captures(text.trim())?;
    let primary: f64 = caps[1].parse().ok()?;
    let secondary: f64 = caps[2].parse().ok()?;
    Some(RatioParts {
        primary,
        secondary,
        ratio: ratio_of(primary, secondary),
    })
}

/// Divide primary by secondary, guarding the zero-secondary case.
pub fn ratio_of(primary: f64, secondary: f64) -> Option<f64> {
    if secondary > 0.0 {
        Some(primary / secondary)
    } else {
        None
    }
}

/// A current magnitude with its source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentValue {
    pub value: f64,
    /// Unit token as written (`A`, `In`, `Ien`), `A` for bare numbers.
    pub unit: String,
    /// Absolute amperes; `None` for per-unit values without a base.
    pub amperes: Option<f64>,
}

/// Parse a current value with an optional unit token.
///
/// Per-unit tokens (`In`, `Ien`) are resolved only when a base current is
/// supplied; bare numbers are assumed to be amperes.
pub fn parse_current(text: &str, base_current: Option<f64>) -> Option<CurrentValue> {
    let text = text.trim();

    if let Some(caps) = SCALAR_WITH_UNIT.captures(text) {
        let value: f64 = caps[1].parse().ok()?;
        let unit = caps[2].to_string();
        let amperes = match unit.as_str() {
            "A" => Some(value),
            "In" | "Ien" => base_current.map(|base| value * base),
            _ => None,
        };
        return Some(CurrentValue { value, unit, amperes });
    }

    // Bare number: assume amperes.
    let value: f64 = text.parse().ok()?;
    Some(CurrentValue {
        value,
        unit: "A".to_string(),
        amperes: Some(value),
    })
}

/// A voltage magnitude normalized to kilovolts.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageValue {
    pub value: f64,
    /// Unit token as written, uppercased (`V` or `KV`).
    pub unit: String,
    /// Value normalized to kilovolts.
    pub kilovolts: f64,
}

/// Parse a voltage value with unit (`13800V`, `13.8 kV`).
pub fn parse_voltage(text: &str) -> Option<VoltageValue> {
    let caps = VOLTAGE.captures(text.trim())?;
    let value: f64 = caps[1].parse().ok()?;
    let is_kilo = !caps[2].is_empty();

    Some(VoltageValue {
        value,
        unit: if is_kilo { "KV" } else { "V" }.to_string(),
        kilovolts: if is_kilo { value } else { value / 1000.0 },
    })
}

/// A time duration normalized to seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeValue {
    pub value: f64,
    pub unit: String,
    pub seconds: f64,
}

/// Parse a time value with unit (`0.5 s`, `100 ms`, `2 min`, `1 h`).
///
/// Bare numbers are assumed to be seconds.
pub fn parse_time(text: &str) -> Option<TimeValue> {
    let text = text.trim();

    if let Some(caps) = SCALAR_WITH_UNIT.captures(text) {
        let value: f64 = caps[1].parse().ok()?;
        let unit = caps[2].to_string();
        let seconds = match unit.as_str() {
            "s" => value,
            "ms" => value / 1000.0,
            "min" => value * 60.0,
            "h" => value * 3600.0,
            _ => return None,
        };
        return Some(TimeValue { value, unit, seconds });
    }

    let value: f64 = text.parse().ok()?;
    Some(TimeValue {
        value,
        unit: "s".to_string(),
        seconds: value,
    })
}

/// Parse a frequency value (`60Hz`, `60 Hz`, `50`).
pub fn parse_frequency(text: &str) -> Option<f64> {
    let cleaned = text
        .trim()
        .trim_end_matches("Hz")
        .trim_end_matches("hz")
        .trim();
    cleaned.parse().ok()
}

const TRUE_TOKENS: &[&str] = &["YES", "Y", "TRUE", "T", "ON", "1", "ENABLED", "ACTIVE"];
const FALSE_TOKENS: &[&str] = &["NO", "N", "FALSE", "F", "OFF", "0", "DISABLED", "INACTIVE"];

/// Normalize a boolean token.
///
/// Membership is case-insensitive against fixed true/false token sets;
/// anything else is `None`.
pub fn normalize_boolean(text: &str) -> Option<bool> {
    let token = text.trim().to_uppercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}
