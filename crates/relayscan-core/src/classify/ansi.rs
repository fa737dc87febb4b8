//! ANSI device code inference from protection function labels.
//!
//! Inference is heuristic and layered: setting-symbol tokens first
//! (longest token wins, `I>>>` before `I>`), then case-insensitive label
//! substrings, then the frequency-stage shorthand. `"Unknown"` is a valid
//! terminal value, never an error.

use lazy_static::lazy_static;
use regex::Regex;

/// Setting symbols as they appear in Easergy and MiCOM labels, ordered
/// longest-first so multi-stage symbols are not shadowed by their prefix.
const SYMBOL_ANSI: &[(&str, &str)] = &[
    ("Ie>>>", "50N"),
    ("Ie>>", "50N"),
    ("Ie>", "51N"),
    ("I0>>", "50N"),
    ("I0>", "51N"),
    ("I2>>", "46"),
    ("I2>", "46"),
    ("I>>>", "50"),
    ("I>>", "50"),
    ("I>", "51"),
    ("I<", "37"),
    ("U<<<", "27"),
    ("U<<", "27"),
    ("U<", "27"),
    ("U>>>", "59"),
    ("U>>", "59"),
    ("U>", "59"),
    ("Vo>>", "59N"),
    ("Vo>", "59N"),
    ("V2>", "47"),
    ("V1<", "27D"),
];

/// Case-insensitive label fragments. Ordered most specific first; the
/// bare "fail" catch-all must stay last.
const LABEL_ANSI: &[(&str, &str)] = &[
    ("breaker fail", "50BF"),
    ("cb fail", "50BF"),
    ("thermal overload", "49"),
    ("short circuit", "50/51"),
    ("earth fault", "50N/51N"),
    ("ground fault", "50N/51N"),
    ("neg seq o/c", "46"),
    ("negative sequence overcurrent", "46"),
    ("neg seq o/v", "47"),
    ("negative sequence overvoltage", "47"),
    ("residual o/v", "59N"),
    ("undervoltage", "27"),
    ("under voltage", "27"),
    ("overvoltage", "59"),
    ("over voltage", "59"),
    ("frequency", "81"),
    ("stall", "14"),
    ("blocked rotor", "14"),
    ("locked rotor", "14"),
    ("reverse power", "32"),
    ("field failure", "40"),
    ("loss of load", "40"),
    ("out of step", "78"),
    ("rtd", "RTD"),
    ("fail", "50BF"),
];

lazy_static! {
    // "f1 FUNCTION", "F3 threshold"
    static ref FREQUENCY_STAGE: Regex = Regex::new(r"(?i)\bf[1-6]\b").unwrap();
}

/// Infer the ANSI device code for a protection function label.
pub fn infer_ansi(label: &str) -> String {
    for (symbol, ansi) in SYMBOL_ANSI {
        if label.contains(symbol) {
            return ansi.to_string();
        }
    }

    let lowered = label.to_lowercase();
    for (fragment, ansi) in LABEL_ANSI {
        if lowered.contains(fragment) {
            return ansi.to_string();
        }
    }

    if FREQUENCY_STAGE.is_match(label) {
        return "81".to_string();
    }

    "Unknown".to_string()
}

/// SEPAM protection section names and the ANSI codes they stand for.
/// Not every name is mechanical: `Protection50_51N` covers the earth
/// stages (`50N/51N`) and `Protection2727S` is plain undervoltage.
const SEPAM_SECTION_ANSI: &[(&str, &str)] = &[
    ("Protection50_51", "50/51"),
    ("Protection50_51N", "50N/51N"),
    ("Protection46", "46"),
    ("Protection47", "47"),
    ("Protection49", "49"),
    ("Protection50BF", "50BF"),
    ("Protection59", "59"),
    ("Protection59N", "59N"),
    ("Protection2727S", "27"),
    ("Protection81", "81"),
    ("Protection32", "32"),
    ("Protection67", "67"),
    ("Protection67N", "67N"),
];

/// ANSI code carried by a SEPAM protection section name. Unmapped
/// sections fall back to the suffix with `_` read as `/`.
pub fn sepam_section_ansi(section: &str) -> Option<String> {
    if let Some((_, ansi)) = SEPAM_SECTION_ANSI.iter().find(|(name, _)| *name == section) {
        return Some((*ansi).to_string());
    }
    let suffix = section.strip_prefix("Protection")?;
    if suffix.is_empty() {
        return None;
    }
    Some(suffix.replace('_', "/"))
}
