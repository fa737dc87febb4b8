//! Document format profiles and signature-based resolution.
//!
//! A profile fixes everything downstream: which line grammars the scanner
//! tries, which classification rule set applies, and which completeness
//! baseline the validator measures against.

pub mod filename;

pub use filename::{parse_filename, FilenameMetadata};

use crate::error::{ExtractError, Result};

/// Supported relay configuration export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// GE MiCOM S1 Agile settings export (P14x/P24x, hex-dot codes).
    MiComAgile,
    /// Schneider Easergy Studio export for current relays (P12x/P22x).
    EasergyCurrent,
    /// Schneider Easergy Studio export for voltage relays (P92x).
    EasergyVoltage,
    /// Schneider SEPAM series 40 INI settings file.
    SepamS40,
}

/// Ordered signature table. First match wins, so the more specific
/// MiCOM banner is checked before the generic Easergy one.
const SIGNATURES: &[(&str, Profile)] = &[
    ("MiCOM S1 Agile", Profile::MiComAgile),
    ("MiCOM Agile", Profile::MiComAgile),
    ("Easergy Studio", Profile::EasergyCurrent),
    ("[Sepam_", Profile::SepamS40),
];

impl Profile {
    /// Manufacturer name implied by this format.
    pub fn manufacturer(&self) -> &'static str {
        match self {
            Profile::MiComAgile => "GENERAL ELECTRIC",
            Profile::EasergyCurrent | Profile::EasergyVoltage | Profile::SepamS40 => {
                "SCHNEIDER ELECTRIC"
            }
        }
    }

    /// Expected parameter count for a complete export of this format.
    /// Used by the validator as the completeness denominator.
    pub fn baseline(&self) -> usize {
        match self {
            Profile::MiComAgile => 600,
            Profile::EasergyCurrent => 450,
            Profile::EasergyVoltage => 400,
            Profile::SepamS40 => 250,
        }
    }

    /// Short display label for logs and warnings.
    pub fn label(&self) -> &'static str {
        match self {
            Profile::MiComAgile => "MiCOM S1 Agile",
            Profile::EasergyCurrent => "Easergy Studio (current)",
            Profile::EasergyVoltage => "Easergy Studio (voltage)",
            Profile::SepamS40 => "SEPAM S40",
        }
    }

    /// True for section/key=value documents, false for coded PDF text.
    pub fn is_ini(&self) -> bool {
        matches!(self, Profile::SepamS40)
    }
}

/// Resolve the format profile from document content, falling back to the
/// filename extension.
///
/// The Easergy banner is shared between current and voltage exports; the
/// split is decided by P92x model evidence in the excerpt or filename.
/// No signature and no known extension is a hard error, the only
/// unrecoverable condition besides an empty scan.
pub fn resolve_profile(excerpt: &str, filename: &str) -> Result<Profile> {
    for (signature, profile) in SIGNATURES {
        if excerpt.contains(signature) {
            if *profile == Profile::EasergyCurrent && is_voltage_relay(excerpt, filename) {
                return Ok(Profile::EasergyVoltage);
            }
            return Ok(*profile);
        }
    }

    if filename.to_lowercase().ends_with(".s40") {
        return Ok(Profile::SepamS40);
    }

    Err(ExtractError::UnknownManufacturer {
        filename: filename.to_string(),
    })
}

fn is_voltage_relay(excerpt: &str, filename: &str) -> bool {
    excerpt.contains("P92") || filename.to_uppercase().contains("P92")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_micom_banner() {
        let profile = resolve_profile("MiCOM S1 Agile\nP143 Settings", "p143.pdf").unwrap();
        assert_eq!(profile, Profile::MiComAgile);
        assert_eq!(profile.manufacturer(), "GENERAL ELECTRIC");
    }

    #[test]
    fn test_resolve_easergy_current_vs_voltage() {
        let current = resolve_profile("Easergy Studio\nP122", "P_122 52-MF-03B1.pdf").unwrap();
        assert_eq!(current, Profile::EasergyCurrent);

        let voltage = resolve_profile("Easergy Studio\nP922", "P_922 52-PT-01.pdf").unwrap();
        assert_eq!(voltage, Profile::EasergyVoltage);

        // Filename evidence alone is enough for the voltage split.
        let voltage = resolve_profile("Easergy Studio", "P922_00-PT-2.pdf").unwrap();
        assert_eq!(voltage, Profile::EasergyVoltage);
    }

    #[test]
    fn test_resolve_sepam_by_section_and_extension() {
        let by_section = resolve_profile("[Sepam_Caracteristiques]", "relay.txt").unwrap();
        assert_eq!(by_section, Profile::SepamS40);

        let by_extension = resolve_profile("garbled bytes", "00-MF-12_2016-03-31.S40").unwrap();
        assert_eq!(by_extension, Profile::SepamS40);
    }

    #[test]
    fn test_resolve_unknown_is_hard_error() {
        let err = resolve_profile("no banner here", "mystery.pdf").unwrap_err();
        assert!(err.to_string().contains("mystery.pdf"));
    }

    #[test]
    fn test_baselines_ordering() {
        assert!(Profile::MiComAgile.baseline() > Profile::EasergyCurrent.baseline());
        assert!(Profile::EasergyVoltage.baseline() > Profile::SepamS40.baseline());
    }
}
