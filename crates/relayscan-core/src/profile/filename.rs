//! Filename grammars for relay configuration exports.
//!
//! Site archives follow two naming conventions: PDF settings exports
//! (`P_122 52-MF-03B1_2021-03-17.pdf`) and SEPAM INI files
//! (`00-MF-12_2016-03-31.S40`). Both carry panel and date tokens that the
//! documents themselves omit. A filename that matches neither grammar
//! yields empty metadata, never an error.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "00-MF-12_2016-03-31.S40"
    static ref SEPAM_NAME: Regex =
        Regex::new(r"(?i)^(\d+)-([A-Z]{2,})-(\w+)_(\d{4}-\d{2}-\d{2})\.S40$").unwrap();

    // "P_122 52-MF-03B1_2021-03-17.pdf", "P143_204-MF-2B_2018-06-13.pdf"
    static ref PDF_NAME: Regex =
        Regex::new(r"(?i)^P_?(\d{3})[\s_](\d+)-([A-Z]{2})-(\w+)_(\d{4}-\d{2}-\d{2})\.pdf$")
            .unwrap();

    // Same grammar without the trailing date.
    static ref PDF_NAME_NO_DATE: Regex =
        Regex::new(r"(?i)^P_?(\d{3})[\s_](\d+)-([A-Z]{2})-(\w+)\.pdf$").unwrap();
}

/// Panel-type codes used in filenames, with their descriptions.
const PANEL_TYPES: &[(&str, &str)] = &[
    ("MF", "Main feeder"),
    ("MK", "Motor contactor"),
    ("MP", "Motor protection"),
    ("TR", "Transformer"),
    ("GN", "Generator"),
    ("MT", "Motor"),
    ("BU", "Bus"),
    ("PT", "Potential transformer"),
    ("CT", "Current transformer"),
];

/// P-series model numbers made by GE; everything else in the P-series
/// catalog is Schneider.
const GE_MODELS: &[&str] = &[
    "143", "241", "242", "243", "441", "442", "443", "542", "543", "544", "545",
];

/// Identity tokens recovered from a filename. All fields optional; a
/// non-matching filename produces the empty value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilenameMetadata {
    /// Relay model (`P122`, `P143`).
    pub model: Option<String>,
    /// Switchgear element (ANSI device) code, e.g. `52` for a breaker.
    pub ansi_code: Option<String>,
    /// Panel-type code (`MF`, `TR`, ...).
    pub panel_type: Option<String>,
    /// Description of the panel-type code when it is a known one.
    pub panel_description: Option<String>,
    /// Bus/bay identifier.
    pub bay_identifier: Option<String>,
    /// Substation code (SEPAM naming only).
    pub substation_code: Option<String>,
    /// Configuration date.
    pub config_date: Option<NaiveDate>,
    /// Manufacturer inferred from the model number.
    pub manufacturer: Option<String>,
}

impl FilenameMetadata {
    /// True when no grammar matched and every field is unset.
    pub fn is_empty(&self) -> bool {
        *self == FilenameMetadata::default()
    }
}

/// Parse a filename against the known naming grammars, first match wins.
pub fn parse_filename(filename: &str) -> FilenameMetadata {
    let name = filename.trim();

    if let Some(caps) = SEPAM_NAME.captures(name) {
        let panel = caps[2].to_uppercase();
        return FilenameMetadata {
            substation_code: Some(caps[1].to_string()),
            panel_description: panel_description(&panel),
            panel_type: Some(panel),
            bay_identifier: Some(caps[3].to_string()),
            config_date: parse_date(&caps[4]),
            ..FilenameMetadata::default()
        };
    }

    if let Some(caps) = PDF_NAME.captures(name) {
        return pdf_metadata(&caps[1], &caps[2], &caps[3], &caps[4], Some(&caps[5]));
    }

    if let Some(caps) = PDF_NAME_NO_DATE.captures(name) {
        return pdf_metadata(&caps[1], &caps[2], &caps[3], &caps[4], None);
    }

    FilenameMetadata::default()
}

fn pdf_metadata(
    model_digits: &str,
    element: &str,
    panel: &str,
    bay: &str,
    date: Option<&str>,
) -> FilenameMetadata {
    let panel = panel.to_uppercase();
    FilenameMetadata {
        model: Some(format!("P{model_digits}")),
        manufacturer: Some(manufacturer_for_model(model_digits).to_string()),
        ansi_code: Some(element.to_string()),
        panel_description: panel_description(&panel),
        panel_type: Some(panel),
        bay_identifier: Some(bay.to_string()),
        config_date: date.and_then(parse_date),
        ..FilenameMetadata::default()
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn panel_description(code: &str) -> Option<String> {
    PANEL_TYPES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, description)| description.to_string())
}

/// Manufacturer implied by a P-series model number.
///
/// Exact model lists take priority; the P14x/P24x families fall back to
/// GE by range; anything else defaults to Schneider.
pub fn manufacturer_for_model(model_digits: &str) -> &'static str {
    if GE_MODELS.contains(&model_digits) {
        return "GENERAL ELECTRIC";
    }
    if let Ok(number) = model_digits.parse::<u32>() {
        if (140..=149).contains(&number) || (240..=249).contains(&number) {
            return "GENERAL ELECTRIC";
        }
    }
    "SCHNEIDER ELECTRIC"
}
