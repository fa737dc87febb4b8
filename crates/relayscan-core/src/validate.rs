//! Completeness scoring and structural checks over classified output.

use crate::classify::Classified;
use crate::models::ValidationReport;
use crate::profile::Profile;

/// Fraction of the profile baseline below which a document is flagged
/// as a likely truncated export.
const SPARSE_THRESHOLD: f64 = 0.30;

/// Score a classified document against its profile's expectations.
///
/// The report is always produced; problems become warnings, and the
/// caller decides what to do with a low score.
pub fn validate(profile: Profile, classified: &Classified) -> ValidationReport {
    let total = classified.parameters.len();
    let baseline = profile.baseline() as f64;
    let completeness_score = (total as f64 / baseline * 100.0).min(100.0);

    let enabled_protection_count = classified
        .protections
        .iter()
        .filter(|protection| protection.is_enabled)
        .count();

    let mut warnings = Vec::new();

    if classified.current_transformers.is_empty() && classified.voltage_transformers.is_empty() {
        warnings.push("no CT or VT readings extracted".to_string());
    }
    if enabled_protection_count == 0 {
        warnings.push("no enabled protection functions".to_string());
    }
    if (total as f64) < baseline * SPARSE_THRESHOLD {
        warnings.push(format!(
            "only {} parameters extracted, {} profile expects around {}",
            total,
            profile.label(),
            profile.baseline()
        ));
    }

    // Profile-specific structure markers.
    match profile {
        Profile::EasergyCurrent | Profile::EasergyVoltage => {
            let has_general_block = classified
                .parameters
                .iter()
                .any(|param| param.code_or_section.starts_with("01"));
            if !has_general_block {
                warnings.push("no 01xx general-settings codes found".to_string());
            }
        }
        Profile::MiComAgile => {
            if classified.model_number.is_none() {
                warnings.push("no Model Number line found".to_string());
            }
        }
        Profile::SepamS40 => {
            let has_characteristics = classified
                .parameters
                .iter()
                .any(|param| param.code_or_section.eq_ignore_ascii_case("Sepam_Caracteristiques"));
            if !has_characteristics {
                warnings.push("no [Sepam_Caracteristiques] section found".to_string());
            }
        }
    }

    ValidationReport {
        total_parameters: total,
        ct_count: classified.current_transformers.len(),
        vt_count: classified.voltage_transformers.len(),
        protection_count: classified.protections.len(),
        enabled_protection_count,
        completeness_score,
        warnings,
    }
}
