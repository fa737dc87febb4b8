//! Domain classification of raw parameters into typed relay records.
//!
//! The classifier walks the scanned parameters once, in document order,
//! and pairs CT/VT primary/secondary lines, unpacks protection toggles
//! and packed status blocks, and collects identity fields. Everything it
//! cannot place stays available verbatim in the parameter list; problems
//! surface as warnings, never as errors.

pub mod ansi;
pub mod rules;

pub use ansi::{infer_ansi, sepam_section_ansi};
pub use rules::{RuleSet, RuleTarget};

use std::collections::{BTreeMap, HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::convert::{normalize_boolean, parse_current, parse_frequency, parse_ratio, parse_voltage};
use crate::models::{
    CurrentTransformerReading, ProtectionFunctionRecord, RawParameter, TransformerKind,
    VoltageTransformerReading,
};
use crate::profile::Profile;

lazy_static! {
    // "09.0B: Thermal Overload: Enabled" segments inside packed values.
    static ref PACKED_SEGMENT: Regex =
        Regex::new(r"([0-9A-F]{2}\.[0-9A-F]{2}):\s*([^:|]+?)\s*:\s*(Enabled|Disabled)").unwrap();
}

/// Output of one classification pass over a document.
#[derive(Debug, Default)]
pub struct Classified {
    pub current_transformers: Vec<CurrentTransformerReading>,
    pub voltage_transformers: Vec<VoltageTransformerReading>,
    pub protections: Vec<ProtectionFunctionRecord>,
    /// Every raw parameter, untouched and in document order.
    pub parameters: Vec<RawParameter>,
    pub frequency_hz: Option<f64>,
    pub software_version: Option<String>,
    pub model_number: Option<String>,
    pub model_type: Option<String>,
    pub plant_reference: Option<String>,
    pub serial_number: Option<String>,
    pub warnings: Vec<String>,
}

/// One SEPAM protection section accumulated across its keys.
#[derive(Debug, Default)]
struct SepamSection {
    enabled: bool,
    setpoints: BTreeMap<String, String>,
}

/// Rule-driven classifier for one document profile.
pub struct DomainClassifier {
    profile: Profile,
    rules: &'static RuleSet,
}

impl DomainClassifier {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            rules: RuleSet::for_profile(profile),
        }
    }

    /// Classify scanned parameters into typed records.
    pub fn classify(&self, parameters: Vec<RawParameter>) -> Classified {
        let mut out = Classified::default();

        // Primary readings wait here until their secondary arrives.
        let mut pending_ct: HashMap<TransformerKind, (f64, usize)> = HashMap::new();
        let mut pending_vt: HashMap<TransformerKind, (f64, usize)> = HashMap::new();
        let mut sepam_ct_secondary: Option<f64> = None;
        let mut sepam_vt_secondary: Option<f64> = None;

        let mut seen_codes: HashSet<String> = HashSet::new();
        let mut last_protection: Option<usize> = None;

        let mut section_order: Vec<String> = Vec::new();
        let mut sections: HashMap<String, SepamSection> = HashMap::new();

        for param in &parameters {
            let Some((rule_name, target)) = self.rules.first_match(param) else {
                self.attach_setpoint(param, last_protection, &mut out.protections);
                continue;
            };
            debug!(rule = rule_name, line = param.line_number, "matched");

            match target {
                RuleTarget::CtPrimary(kind) => {
                    // A single line can carry the whole ratio.
                    if let Some(parts) = parse_ratio(&param.value) {
                        out.current_transformers.push(CurrentTransformerReading {
                            kind,
                            primary: parts.primary,
                            secondary: parts.secondary,
                            ratio: parts.ratio,
                            enabled: None,
                        });
                        continue;
                    }
                    let Some(primary) = current_scalar(&param.value) else {
                        out.warnings.push(format!(
                            "unreadable {} CT primary '{}' at line {}",
                            kind.label(),
                            param.value,
                            param.line_number
                        ));
                        continue;
                    };
                    if let Some((stale, line)) = pending_ct.insert(kind, (primary, param.line_number))
                    {
                        out.warnings.push(format!(
                            "unpaired {} CT primary {} at line {}",
                            kind.label(),
                            stale,
                            line
                        ));
                    }
                }
                RuleTarget::CtSecondary(kind) => {
                    let Some(secondary) = current_scalar(&param.value) else {
                        continue;
                    };
                    match pending_ct.remove(&kind) {
                        Some((primary, _)) => {
                            out.current_transformers.push(reading_ct(kind, primary, secondary));
                        }
                        None => out.warnings.push(format!(
                            "{} CT secondary without primary at line {}",
                            kind.label(),
                            param.line_number
                        )),
                    }
                }
                RuleTarget::VtPrimary(kind) => {
                    if let Some(parts) = parse_ratio(&param.value) {
                        out.voltage_transformers.push(VoltageTransformerReading {
                            kind,
                            primary: parts.primary,
                            secondary: parts.secondary,
                            ratio: parts.ratio,
                            enabled: None,
                        });
                        continue;
                    }
                    let Some(primary) = voltage_scalar(&param.value) else {
                        out.warnings.push(format!(
                            "unreadable {} VT primary '{}' at line {}",
                            kind.label(),
                            param.value,
                            param.line_number
                        ));
                        continue;
                    };
                    if let Some((stale, line)) = pending_vt.insert(kind, (primary, param.line_number))
                    {
                        out.warnings.push(format!(
                            "unpaired {} VT primary {} at line {}",
                            kind.label(),
                            stale,
                            line
                        ));
                    }
                }
                RuleTarget::VtSecondary(kind) => {
                    let Some(secondary) = voltage_scalar(&param.value) else {
                        continue;
                    };
                    match pending_vt.remove(&kind) {
                        Some((primary, _)) => {
                            out.voltage_transformers.push(reading_vt(kind, primary, secondary));
                        }
                        None => out.warnings.push(format!(
                            "{} VT secondary without primary at line {}",
                            kind.label(),
                            param.line_number
                        )),
                    }
                }
                RuleTarget::CtSecondaryCode => {
                    // calibre_TC=1 selects the 5 A sensor, anything else 1 A.
                    sepam_ct_secondary = Some(if param.value.trim() == "1" { 5.0 } else { 1.0 });
                }
                RuleTarget::VtSecondaryCode => {
                    sepam_vt_secondary = Some(match param.value.trim() {
                        "1" => 100.0,
                        "2" => 110.0,
                        "3" => 120.0,
                        _ => 115.0,
                    });
                }
                RuleTarget::ProtectionToggle => {
                    let label = clean_label(&param.key);
                    let enabled = toggle_state(&param.value);
                    if seen_codes.insert(param.code_or_section.clone()) {
                        out.protections.push(ProtectionFunctionRecord {
                            source_code: param.code_or_section.clone(),
                            ansi_code: infer_ansi(&label),
                            function_label: label,
                            is_enabled: enabled,
                            setpoints: BTreeMap::new(),
                        });
                        last_protection = Some(out.protections.len() - 1);
                    }
                    // MiCOM toggles may drag further packed segments along.
                    unpack_segments(param, &mut seen_codes, &mut out.protections);
                }
                RuleTarget::ProtectionPacked => {
                    unpack_segments(param, &mut seen_codes, &mut out.protections);
                }
                RuleTarget::Frequency => {
                    if out.frequency_hz.is_none() {
                        out.frequency_hz = parse_frequency(&param.value);
                    }
                }
                RuleTarget::FrequencyCode => {
                    // frequence_reseau=1 selects 60 Hz networks.
                    out.frequency_hz =
                        Some(if param.value.trim() == "1" { 60.0 } else { 50.0 });
                }
                RuleTarget::SoftwareVersion => {
                    set_if_empty(&mut out.software_version, &param.value);
                }
                RuleTarget::Application => {
                    if out.model_type.is_none() && !param.value.trim().is_empty() {
                        out.model_type = Some(format!("SEPAM {}", param.value.trim()));
                    }
                }
                RuleTarget::ModelNumber => {
                    set_if_empty(&mut out.model_number, &param.value);
                }
                RuleTarget::ModelType => {
                    set_if_empty(&mut out.model_type, &param.value);
                }
                RuleTarget::PlantReference => {
                    set_if_empty(&mut out.plant_reference, &param.value);
                    // SEPAM repere carries a trailing serial number:
                    // "00-MF-12 NS08170043".
                    if self.profile == Profile::SepamS40 && out.serial_number.is_none() {
                        let parts: Vec<&str> = param.value.split_whitespace().collect();
                        if parts.len() > 1 {
                            out.serial_number = parts.last().map(|part| part.to_string());
                        }
                    }
                }
                RuleTarget::SepamActivity => {
                    let section = sections.entry(param.code_or_section.clone()).or_insert_with(|| {
                        section_order.push(param.code_or_section.clone());
                        SepamSection::default()
                    });
                    section.enabled |= param.value.trim() == "1";
                }
                RuleTarget::SepamSetpoint => {
                    let section = sections.entry(param.code_or_section.clone()).or_insert_with(|| {
                        section_order.push(param.code_or_section.clone());
                        SepamSection::default()
                    });
                    section
                        .setpoints
                        .insert(param.key.clone(), param.value.clone());
                }
            }
        }

        self.flush_pending(
            pending_ct,
            pending_vt,
            sepam_ct_secondary,
            sepam_vt_secondary,
            &mut out,
        );

        for name in section_order {
            let section = sections.remove(&name).unwrap_or_default();
            out.protections.push(ProtectionFunctionRecord {
                ansi_code: sepam_section_ansi(&name).unwrap_or_else(|| "Unknown".to_string()),
                function_label: name.clone(),
                source_code: name,
                is_enabled: section.enabled,
                setpoints: section.setpoints,
            });
        }

        out.parameters = parameters;
        out
    }

    /// Coded lines that match no rule may still be setpoints of the most
    /// recent protection toggle (`0210: I>> FUNCTION ?` then `0211: I>>`).
    fn attach_setpoint(
        &self,
        param: &RawParameter,
        last_protection: Option<usize>,
        protections: &mut [ProtectionFunctionRecord],
    ) {
        if self.profile.is_ini() || param.code_or_section.is_empty() || param.value.is_empty() {
            return;
        }
        let Some(index) = last_protection else { return };
        let label = protections[index].function_label.clone();
        if !label.is_empty() && param.key.starts_with(&label) {
            protections[index]
                .setpoints
                .insert(param.key.clone(), param.value.clone());
        }
    }

    /// Resolve leftover primaries: SEPAM documents state secondaries as
    /// sensor codes (or imply them), PDF documents should have paired
    /// them already.
    fn flush_pending(
        &self,
        pending_ct: HashMap<TransformerKind, (f64, usize)>,
        pending_vt: HashMap<TransformerKind, (f64, usize)>,
        sepam_ct_secondary: Option<f64>,
        sepam_vt_secondary: Option<f64>,
        out: &mut Classified,
    ) {
        if self.profile == Profile::SepamS40 {
            for (kind, (primary, _)) in pending_ct {
                let secondary = match kind {
                    TransformerKind::Residual => 1.0,
                    _ => sepam_ct_secondary.unwrap_or(1.0),
                };
                out.current_transformers.push(reading_ct(kind, primary, secondary));
            }
            for (kind, (primary, _)) in pending_vt {
                let secondary = sepam_vt_secondary.unwrap_or(115.0);
                out.voltage_transformers.push(reading_vt(kind, primary, secondary));
            }
            return;
        }

        for (kind, (primary, line)) in pending_ct {
            out.warnings.push(format!(
                "unpaired {} CT primary {} at line {}",
                kind.label(),
                primary,
                line
            ));
        }
        for (kind, (primary, line)) in pending_vt {
            out.warnings.push(format!(
                "unpaired {} VT primary {} at line {}",
                kind.label(),
                primary,
                line
            ));
        }
    }
}

fn reading_ct(kind: TransformerKind, primary: f64, secondary: f64) -> CurrentTransformerReading {
    CurrentTransformerReading {
        kind,
        primary,
        secondary,
        ratio: crate::convert::ratio_of(primary, secondary),
        enabled: None,
    }
}

fn reading_vt(kind: TransformerKind, primary: f64, secondary: f64) -> VoltageTransformerReading {
    VoltageTransformerReading {
        kind,
        primary,
        secondary,
        ratio: crate::convert::ratio_of(primary, secondary),
        enabled: None,
    }
}

fn set_if_empty(slot: &mut Option<String>, value: &str) {
    let value = value.trim();
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn current_scalar(value: &str) -> Option<f64> {
    let current = parse_current(value, None)?;
    Some(current.amperes.unwrap_or(current.value))
}

fn voltage_scalar(value: &str) -> Option<f64> {
    if let Some(voltage) = parse_voltage(value) {
        return Some(voltage.kilovolts * 1000.0);
    }
    value.trim().parse().ok()
}

/// Strip the FUNCTION keyword and trailing question mark from a toggle
/// key: `I>> FUNCTION ?` becomes `I>>`.
fn clean_label(key: &str) -> String {
    key.split_whitespace()
        .filter(|word| *word != "?" && !word.eq_ignore_ascii_case("function"))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('?')
        .trim()
        .to_string()
}

/// Enabled state from a toggle value, tolerating a leading `?` echo and
/// a packed tail after `|`.
fn toggle_state(value: &str) -> bool {
    let first = value
        .trim_start_matches('?')
        .split('|')
        .next()
        .unwrap_or("")
        .trim();
    normalize_boolean(first).unwrap_or(false)
}

/// Unpack `code: label: state` segments from a packed value and its
/// continuation lines. Codes already emitted are skipped.
fn unpack_segments(
    param: &RawParameter,
    seen_codes: &mut HashSet<String>,
    protections: &mut Vec<ProtectionFunctionRecord>,
) {
    let mut texts: Vec<&str> = vec![&param.value];
    texts.extend(param.continuation.iter().map(String::as_str));

    for text in texts {
        for caps in PACKED_SEGMENT.captures_iter(text) {
            let code = caps[1].to_string();
            if !seen_codes.insert(code.clone()) {
                continue;
            }
            let label = clean_label(&caps[2]);
            protections.push(ProtectionFunctionRecord {
                source_code: code,
                ansi_code: infer_ansi(&label),
                function_label: label,
                is_enabled: &caps[3] == "Enabled",
                setpoints: BTreeMap::new(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param(code: &str, key: &str, value: &str) -> RawParameter {
        RawParameter::new(code, key, value, 1)
    }

    #[test]
    fn test_ct_pairing_easergy() {
        let classifier = DomainClassifier::new(Profile::EasergyCurrent);
        let classified = classifier.classify(vec![
            param("0120", "Line CT primary", "1500"),
            param("0121", "Line CT sec", "5"),
            param("0122", "E/Gnd CT primary", "100"),
            param("0123", "E/Gnd CT sec", "1"),
        ]);

        assert_eq!(classified.current_transformers.len(), 2);
        let phase = &classified.current_transformers[0];
        assert_eq!(phase.kind, TransformerKind::Phase);
        assert_eq!(phase.primary, 1500.0);
        assert_eq!(phase.secondary, 5.0);
        assert_eq!(phase.ratio, Some(300.0));
        assert_eq!(classified.current_transformers[1].ratio, Some(100.0));
        assert!(classified.warnings.is_empty());
    }

    #[test]
    fn test_unpaired_primary_warns_without_emitting() {
        let classifier = DomainClassifier::new(Profile::EasergyCurrent);
        let classified = classifier.classify(vec![param("0120", "Line CT primary", "1500")]);

        assert!(classified.current_transformers.is_empty());
        assert_eq!(classified.warnings.len(), 1);
        assert!(classified.warnings[0].contains("unpaired Phase CT primary"));
    }

    #[test]
    fn test_single_line_ratio_value() {
        let classifier = DomainClassifier::new(Profile::EasergyCurrent);
        let classified = classifier.classify(vec![param("0120", "Line CT primary", "1500/5")]);

        assert_eq!(classified.current_transformers.len(), 1);
        assert_eq!(classified.current_transformers[0].ratio, Some(300.0));
        assert!(classified.warnings.is_empty());
    }

    #[test]
    fn test_toggle_label_cleanup_and_setpoint_attach() {
        let classifier = DomainClassifier::new(Profile::EasergyCurrent);
        let classified = classifier.classify(vec![
            param("0200", "I> FUNCTION ?", "YES"),
            param("0201", "I>", "0.63In"),
            param("0210", "I>> FUNCTION ?", "NO"),
        ]);

        assert_eq!(classified.protections.len(), 2);
        let first = &classified.protections[0];
        assert_eq!(first.function_label, "I>");
        assert_eq!(first.ansi_code, "51");
        assert!(first.is_enabled);
        assert_eq!(first.setpoints.get("I>").map(String::as_str), Some("0.63In"));

        let second = &classified.protections[1];
        assert_eq!(second.ansi_code, "50");
        assert!(!second.is_enabled);
    }

    #[test]
    fn test_micom_packed_and_toggle_lines() {
        let classifier = DomainClassifier::new(Profile::MiComAgile);
        let mut status = param("09.01", "Protection Status", "");
        status.continuation.push(
            "09.0B: Thermal Overload: Enabled | 09.0C: Short Circuit: Enabled".to_string(),
        );
        status.is_continuation_block = true;

        let classified = classifier.classify(vec![
            status,
            param("09.0D", "Earth Fault 1", "Disabled"),
        ]);

        assert_eq!(classified.protections.len(), 3);
        assert_eq!(classified.protections[0].source_code, "09.0B");
        assert_eq!(classified.protections[0].ansi_code, "49");
        assert_eq!(classified.protections[1].ansi_code, "50/51");
        assert!(!classified.protections[2].is_enabled);
        assert_eq!(classified.protections[2].ansi_code, "50N/51N");
    }

    #[test]
    fn test_packed_codes_deduplicate() {
        let classifier = DomainClassifier::new(Profile::MiComAgile);
        let classified = classifier.classify(vec![
            param("09.0B", "Thermal Overload", "Enabled | 09.0C: Short Circuit: Enabled"),
            param("09.02", "Status Echo", "09.0B: Thermal Overload: Enabled"),
        ]);

        assert_eq!(classified.protections.len(), 2);
    }

    #[test]
    fn test_sepam_sections_and_sensor_codes() {
        let classifier = DomainClassifier::new(Profile::SepamS40);
        let classified = classifier.classify(vec![
            param("Sepam_Caracteristiques", "i_nominal", "200"),
            param("Sepam_Caracteristiques", "calibre_TC", "1"),
            param("Sepam_Caracteristiques", "tension_primaire_nominale", "13800"),
            param("Sepam_Caracteristiques", "tension_secondaire_nominale", "0"),
            param("Sepam_Caracteristiques", "frequence_reseau", "1"),
            param("Protection50_51", "activite_1", "1"),
            param("Protection50_51", "seuil_1", "2.5"),
            param("Protection27", "activite_1", "0"),
        ]);

        assert_eq!(classified.current_transformers.len(), 1);
        let ct = &classified.current_transformers[0];
        assert_eq!(ct.primary, 200.0);
        assert_eq!(ct.secondary, 5.0);
        assert_eq!(ct.ratio, Some(40.0));

        assert_eq!(classified.voltage_transformers.len(), 1);
        let vt = &classified.voltage_transformers[0];
        assert_eq!(vt.primary, 13800.0);
        assert_eq!(vt.secondary, 115.0);
        assert_eq!(vt.ratio, Some(120.0));

        assert_eq!(classified.frequency_hz, Some(60.0));

        assert_eq!(classified.protections.len(), 2);
        let oc = &classified.protections[0];
        assert_eq!(oc.ansi_code, "50/51");
        assert!(oc.is_enabled);
        assert_eq!(oc.setpoints.get("seuil_1").map(String::as_str), Some("2.5"));
        assert!(!classified.protections[1].is_enabled);
    }

    #[test]
    fn test_sepam_repere_serial_split() {
        let classifier = DomainClassifier::new(Profile::SepamS40);
        let classified = classifier.classify(vec![param(
            "Sepam_ConfigMaterielle",
            "repere",
            "00-MF-12 NS08170043",
        )]);

        // Full repere stays the plant reference.
        assert_eq!(
            classified.plant_reference.as_deref(),
            Some("00-MF-12 NS08170043")
        );
        assert_eq!(classified.serial_number.as_deref(), Some("NS08170043"));

        // No trailing token means no serial.
        let classified = classifier.classify(vec![param(
            "Sepam_ConfigMaterielle",
            "repere",
            "00-MF-12",
        )]);
        assert_eq!(classified.serial_number, None);
    }

    #[test]
    fn test_identity_fields_first_wins() {
        let classifier = DomainClassifier::new(Profile::MiComAgile);
        let classified = classifier.classify(vec![
            param("", "Model Number", "P143317B2M0520J"),
            param("", "Model Number", "OVERWRITE"),
            param("", "Software Ref. 1", "B2"),
            param("", "Frequency", "60 Hz"),
        ]);

        assert_eq!(classified.model_number.as_deref(), Some("P143317B2M0520J"));
        assert_eq!(classified.software_version.as_deref(), Some("B2"));
        assert_eq!(classified.frequency_hz, Some(60.0));
    }

    #[test]
    fn test_all_parameters_preserved() {
        let classifier = DomainClassifier::new(Profile::EasergyCurrent);
        let input = vec![
            param("0120", "Line CT primary", "1500"),
            param("0999", "Unclassified thing", "whatever"),
        ];
        let classified = classifier.classify(input.clone());
        assert_eq!(classified.parameters, input);
    }
}
