//! Ordered classification rules per document profile.
//!
//! A rule matches a raw parameter on up to three axes: its code or
//! section, its key, and its value (or any continuation line). Rules are
//! tried in table order and the first match wins, so specific hardware
//! keys must precede the generic protection-toggle rules.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{RawParameter, TransformerKind};
use crate::profile::Profile;

/// What a matched parameter contributes to the classified output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleTarget {
    CtPrimary(TransformerKind),
    CtSecondary(TransformerKind),
    VtPrimary(TransformerKind),
    VtSecondary(TransformerKind),
    /// SEPAM `calibre_TC` sensor code (`1` selects a 5 A secondary).
    CtSecondaryCode,
    /// SEPAM `tension_secondaire_nominale` code (0/1/2/3 selects volts).
    VtSecondaryCode,
    ProtectionToggle,
    /// MiCOM packed status line carrying several `code: label: state`
    /// segments in one value.
    ProtectionPacked,
    Frequency,
    /// SEPAM `frequence_reseau` code (`1` selects 60 Hz).
    FrequencyCode,
    SoftwareVersion,
    /// SEPAM application string (`S40`).
    Application,
    ModelNumber,
    ModelType,
    PlantReference,
    /// SEPAM `activite_N` key inside a protection section.
    SepamActivity,
    /// Any other key inside a SEPAM protection section.
    SepamSetpoint,
}

#[derive(Clone, Copy)]
struct Rule {
    name: &'static str,
    code: Option<&'static str>,
    key: &'static str,
    value: Option<&'static str>,
    target: RuleTarget,
}

struct CompiledRule {
    name: &'static str,
    code: Option<Regex>,
    key: Regex,
    value: Option<Regex>,
    target: RuleTarget,
}

/// A profile's compiled rule table.
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    fn compile(table: &[Rule]) -> Self {
        let rules = table
            .iter()
            .map(|rule| CompiledRule {
                name: rule.name,
                code: rule.code.map(|pattern| Regex::new(pattern).unwrap()),
                key: Regex::new(rule.key).unwrap(),
                value: rule.value.map(|pattern| Regex::new(pattern).unwrap()),
                target: rule.target,
            })
            .collect();
        Self { rules }
    }

    /// First rule matching the parameter, in table order.
    pub fn first_match(&self, param: &RawParameter) -> Option<(&'static str, RuleTarget)> {
        self.rules.iter().find_map(|rule| {
            if let Some(code) = &rule.code {
                if !code.is_match(&param.code_or_section) {
                    return None;
                }
            }
            if !rule.key.is_match(&param.key) {
                return None;
            }
            if let Some(value) = &rule.value {
                let in_value = value.is_match(&param.value);
                let in_continuation =
                    param.continuation.iter().any(|line| value.is_match(line));
                if !in_value && !in_continuation {
                    return None;
                }
            }
            Some((rule.name, rule.target))
        })
    }

    /// Compiled rule table for a profile.
    pub fn for_profile(profile: Profile) -> &'static RuleSet {
        match profile {
            Profile::EasergyCurrent => &EASERGY_CURRENT_RULES,
            Profile::EasergyVoltage => &EASERGY_VOLTAGE_RULES,
            Profile::MiComAgile => &MICOM_RULES,
            Profile::SepamS40 => &SEPAM_RULES,
        }
    }
}

use RuleTarget::*;
use TransformerKind::*;

/// Rules shared by both Easergy dialects: identity, frequency, and the
/// generic `* FUNCTION ?` protection toggles.
const EASERGY_COMMON: &[Rule] = &[
    Rule {
        name: "frequency",
        code: None,
        key: r"(?i)frequency",
        value: None,
        target: Frequency,
    },
    Rule {
        name: "software-version",
        code: None,
        key: r"(?i)(software|firmware)",
        value: None,
        target: SoftwareVersion,
    },
    Rule {
        name: "model-type",
        code: None,
        key: r"(?i)^type\b",
        value: None,
        target: ModelType,
    },
    Rule {
        name: "plant-reference",
        code: None,
        key: r"(?i)^plant\s*reference",
        value: None,
        target: PlantReference,
    },
    Rule {
        name: "protection-toggle",
        code: None,
        key: r"(?i)function",
        value: Some(r"(?i)^\??\s*(yes|no|enabled|disabled)\s*$"),
        target: ProtectionToggle,
    },
];

lazy_static! {
    static ref EASERGY_CURRENT_RULES: RuleSet = {
        let mut table = vec![
            Rule {
                name: "line-ct-primary",
                code: None,
                key: r"(?i)line\s*CT\s*prim",
                value: None,
                target: CtPrimary(Phase),
            },
            Rule {
                name: "line-ct-secondary",
                code: None,
                key: r"(?i)line\s*CT\s*sec",
                value: None,
                target: CtSecondary(Phase),
            },
            Rule {
                name: "egnd-ct-primary",
                code: None,
                key: r"(?i)E/?\s*Gnd\s*CT\s*prim",
                value: None,
                target: CtPrimary(Ground),
            },
            Rule {
                name: "egnd-ct-secondary",
                code: None,
                key: r"(?i)E/?\s*Gnd\s*CT\s*sec",
                value: None,
                target: CtSecondary(Ground),
            },
            // P22x motor exports use the short PRIM/SEC spellings.
            Rule {
                name: "prim-ph-ct",
                code: None,
                key: r"(?i)^PRIM\s*PH",
                value: None,
                target: CtPrimary(Phase),
            },
            Rule {
                name: "sec-ph-ct",
                code: None,
                key: r"(?i)^SEC\s*PH",
                value: None,
                target: CtSecondary(Phase),
            },
            Rule {
                name: "prim-e-ct",
                code: None,
                key: r"(?i)^PRIM\s*E\b",
                value: None,
                target: CtPrimary(Ground),
            },
            Rule {
                name: "sec-e-ct",
                code: None,
                key: r"(?i)^SEC\s*E\b",
                value: None,
                target: CtSecondary(Ground),
            },
        ];
        table.extend(EASERGY_COMMON.iter().copied());
        RuleSet::compile(&table)
    };

    static ref EASERGY_VOLTAGE_RULES: RuleSet = {
        let mut table = vec![
            Rule {
                name: "main-vt-primary",
                code: None,
                key: r"(?i)main\s*VT\s*prim",
                value: None,
                target: VtPrimary(Main),
            },
            // "sec\w*" also covers the "Secundary" spelling seen in
            // P922 exports.
            Rule {
                name: "main-vt-secondary",
                code: None,
                key: r"(?i)main\s*VT\s*sec\w*",
                value: None,
                target: VtSecondary(Main),
            },
            Rule {
                name: "egnd-vt-primary",
                code: None,
                key: r"(?i)E/?\s*Gnd\s*VT\s*prim",
                value: None,
                target: VtPrimary(Nvd),
            },
            Rule {
                name: "egnd-vt-secondary",
                code: None,
                key: r"(?i)E/?\s*Gnd\s*VT\s*sec\w*",
                value: None,
                target: VtSecondary(Nvd),
            },
        ];
        table.extend(EASERGY_COMMON.iter().copied());
        RuleSet::compile(&table)
    };

    static ref MICOM_RULES: RuleSet = RuleSet::compile(&[
        Rule {
            name: "phase-ct-primary",
            code: None,
            key: r"(?i)phase\s*CT\s*prim",
            value: None,
            target: CtPrimary(Phase),
        },
        Rule {
            name: "phase-ct-secondary",
            code: None,
            key: r"(?i)phase\s*CT\s*sec",
            value: None,
            target: CtSecondary(Phase),
        },
        Rule {
            name: "ef-ct-primary",
            code: None,
            key: r"(?i)E/?F\s*CT\s*prim",
            value: None,
            target: CtPrimary(Ground),
        },
        Rule {
            name: "ef-ct-secondary",
            code: None,
            key: r"(?i)E/?F\s*CT\s*sec",
            value: None,
            target: CtSecondary(Ground),
        },
        Rule {
            name: "sef-ct-primary",
            code: None,
            key: r"(?i)SEF\s*CT\s*prim",
            value: None,
            target: CtPrimary(Sef),
        },
        Rule {
            name: "sef-ct-secondary",
            code: None,
            key: r"(?i)SEF\s*CT\s*sec",
            value: None,
            target: CtSecondary(Sef),
        },
        Rule {
            name: "main-vt-primary",
            code: None,
            key: r"(?i)main\s*VT\s*prim",
            value: None,
            target: VtPrimary(Main),
        },
        Rule {
            name: "main-vt-secondary",
            code: None,
            key: r"(?i)main\s*VT\s*sec",
            value: None,
            target: VtSecondary(Main),
        },
        Rule {
            name: "cs-vt-primary",
            code: None,
            key: r"(?i)C/?S\s*VT\s*prim",
            value: None,
            target: VtPrimary(CheckSync),
        },
        Rule {
            name: "cs-vt-secondary",
            code: None,
            key: r"(?i)C/?S\s*VT\s*sec",
            value: None,
            target: VtSecondary(CheckSync),
        },
        Rule {
            name: "nvd-vt-primary",
            code: None,
            key: r"(?i)NVD\s*VT\s*prim",
            value: None,
            target: VtPrimary(Nvd),
        },
        Rule {
            name: "nvd-vt-secondary",
            code: None,
            key: r"(?i)NVD\s*VT\s*sec",
            value: None,
            target: VtSecondary(Nvd),
        },
        Rule {
            name: "frequency",
            code: None,
            key: r"(?i)frequency",
            value: None,
            target: Frequency,
        },
        Rule {
            name: "software-version",
            code: None,
            key: r"(?i)software",
            value: None,
            target: SoftwareVersion,
        },
        Rule {
            name: "model-number",
            code: None,
            key: r"(?i)^model\s*number$",
            value: None,
            target: ModelNumber,
        },
        Rule {
            name: "plant-reference",
            code: None,
            key: r"(?i)^plant\s*reference$",
            value: None,
            target: PlantReference,
        },
        Rule {
            name: "protection-toggle",
            code: Some(r"^[0-9A-F]{2}\.[0-9A-F]{2}$"),
            key: r".",
            value: Some(r"(?i)^(enabled|disabled)\b"),
            target: ProtectionToggle,
        },
        Rule {
            name: "protection-packed",
            code: None,
            key: r".",
            value: Some(r"[0-9A-F]{2}\.[0-9A-F]{2}:"),
            target: ProtectionPacked,
        },
    ]);

    static ref SEPAM_RULES: RuleSet = RuleSet::compile(&[
        Rule {
            name: "sepam-ct-primary",
            code: Some(r"(?i)^Sepam_Caracteristiques$"),
            key: r"(?i)^i_nominal$",
            value: None,
            target: CtPrimary(Phase),
        },
        Rule {
            name: "sepam-ct-sensor-code",
            code: Some(r"(?i)^Sepam_Caracteristiques$"),
            key: r"(?i)^calibre_TC$",
            value: None,
            target: CtSecondaryCode,
        },
        Rule {
            name: "sepam-residual-ct",
            code: Some(r"(?i)^Sepam_Caracteristiques$"),
            key: r"(?i)^courant_nominal_residuel$",
            value: None,
            target: CtPrimary(Residual),
        },
        Rule {
            name: "sepam-vt-primary",
            code: Some(r"(?i)^Sepam_Caracteristiques$"),
            key: r"(?i)^tension_primaire_nominale$",
            value: None,
            target: VtPrimary(Main),
        },
        Rule {
            name: "sepam-vt-secondary-code",
            code: Some(r"(?i)^Sepam_Caracteristiques$"),
            key: r"(?i)^tension_secondaire_nominale$",
            value: None,
            target: VtSecondaryCode,
        },
        Rule {
            name: "sepam-frequency-code",
            code: Some(r"(?i)^Sepam_Caracteristiques$"),
            key: r"(?i)^frequence_reseau$",
            value: None,
            target: FrequencyCode,
        },
        Rule {
            name: "sepam-application",
            code: Some(r"(?i)^Sepam_Caracteristiques$"),
            key: r"(?i)^application$",
            value: None,
            target: Application,
        },
        Rule {
            name: "sepam-plant-reference",
            code: Some(r"(?i)^Sepam_ConfigMaterielle$"),
            key: r"(?i)^repere$",
            value: None,
            target: PlantReference,
        },
        Rule {
            name: "sepam-model-number",
            code: Some(r"(?i)^Sepam_ConfigMaterielle$"),
            key: r"(?i)^modele$",
            value: None,
            target: ModelNumber,
        },
        Rule {
            name: "sepam-protection-activity",
            code: Some(r"^Protection"),
            key: r"(?i)^activite_\d+$",
            value: None,
            target: SepamActivity,
        },
        Rule {
            name: "sepam-protection-setpoint",
            code: Some(r"^Protection"),
            key: r".",
            value: None,
            target: SepamSetpoint,
        },
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param(code: &str, key: &str, value: &str) -> RawParameter {
        RawParameter::new(code, key, value, 1)
    }

    #[test]
    fn test_easergy_ct_rules_precede_toggles() {
        let rules = RuleSet::for_profile(Profile::EasergyCurrent);

        let (name, target) = rules
            .first_match(&param("0120", "Line CT primary", "1500"))
            .unwrap();
        assert_eq!(name, "line-ct-primary");
        assert_eq!(target, CtPrimary(Phase));

        let (name, target) = rules
            .first_match(&param("0210", "I>> FUNCTION ?", "YES"))
            .unwrap();
        assert_eq!(name, "protection-toggle");
        assert_eq!(target, ProtectionToggle);
    }

    #[test]
    fn test_easergy_short_spellings() {
        let rules = RuleSet::for_profile(Profile::EasergyCurrent);
        let (_, target) = rules.first_match(&param("0101", "PRIM PH CT", "300")).unwrap();
        assert_eq!(target, CtPrimary(Phase));
        let (_, target) = rules.first_match(&param("0102", "SEC PH CT", "1")).unwrap();
        assert_eq!(target, CtSecondary(Phase));
    }

    #[test]
    fn test_voltage_profile_accepts_secundary_typo() {
        let rules = RuleSet::for_profile(Profile::EasergyVoltage);
        let (_, target) = rules
            .first_match(&param("0110", "Main VT Secundary", "115"))
            .unwrap();
        assert_eq!(target, VtSecondary(Main));
    }

    #[test]
    fn test_micom_toggle_requires_coded_line() {
        let rules = RuleSet::for_profile(Profile::MiComAgile);

        let (_, target) = rules
            .first_match(&param("09.0B", "Thermal Overload", "Enabled"))
            .unwrap();
        assert_eq!(target, ProtectionToggle);

        // Uncoded Enabled lines are not protection toggles.
        assert!(rules.first_match(&param("", "Language", "Enabled")).is_none());
    }

    #[test]
    fn test_micom_packed_matches_in_continuation() {
        let rules = RuleSet::for_profile(Profile::MiComAgile);
        let mut status = param("09.01", "Protection Status", "");
        status.continuation.push("09.0B: Thermal Overload: Enabled".to_string());
        status.is_continuation_block = true;

        let (name, target) = rules.first_match(&status).unwrap();
        assert_eq!(name, "protection-packed");
        assert_eq!(target, ProtectionPacked);
    }

    #[test]
    fn test_sepam_rules_are_section_scoped() {
        let rules = RuleSet::for_profile(Profile::SepamS40);

        let (_, target) = rules
            .first_match(&param("Sepam_Caracteristiques", "i_nominal", "200"))
            .unwrap();
        assert_eq!(target, CtPrimary(Phase));

        // Same key outside its section matches nothing.
        assert!(rules.first_match(&param("Autre", "i_nominal", "200")).is_none());

        let (_, target) = rules
            .first_match(&param("Protection50_51", "activite_1", "1"))
            .unwrap();
        assert_eq!(target, SepamActivity);

        let (_, target) = rules
            .first_match(&param("Protection50_51", "seuil_1", "2.5"))
            .unwrap();
        assert_eq!(target, SepamSetpoint);
    }
}
