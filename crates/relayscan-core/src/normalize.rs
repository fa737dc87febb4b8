//! Fusion of filename metadata and classified document fields into one
//! normalized relay record.
//!
//! Field priority is fixed: the document wins over the filename, and a
//! field neither source provides stays `None`. The voltage class is the
//! single exception, it only ever comes from a VT primary reading.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::classify::Classified;
use crate::models::{RelayRecord, VoltageSource};
use crate::profile::{FilenameMetadata, Profile};

/// Model-prefix to application-type table. Longest matching prefix wins,
/// so exact models can override their family entry.
const RELAY_TYPES: &[(&str, &str)] = &[
    ("P122", "Overcurrent"),
    ("P123", "Overcurrent"),
    ("P12", "Overcurrent"),
    ("P143", "Feeder"),
    ("P14", "Feeder"),
    ("P220", "Motor"),
    ("P22", "Motor"),
    ("P241", "Motor"),
    ("P24", "Motor"),
    ("P922", "Voltage"),
    ("P92", "Voltage"),
    ("SEPAM", "Feeder"),
];

/// Longest-prefix model lookup over the built-in table plus any
/// site-specific entries added at construction.
#[derive(Debug, Default)]
pub struct RelayTypeTable {
    custom: Vec<(String, String)>,
}

impl RelayTypeTable {
    /// Add a site-specific prefix mapping. Custom entries win ties
    /// against built-ins of the same prefix length.
    pub fn insert(&mut self, prefix: impl Into<String>, relay_type: impl Into<String>) {
        self.custom
            .push((prefix.into().to_uppercase(), relay_type.into()));
    }

    pub fn lookup(&self, model: &str) -> Option<&str> {
        let model = model.trim().to_uppercase();

        let builtin = RELAY_TYPES
            .iter()
            .filter(|(prefix, _)| model.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len());
        let custom = self
            .custom
            .iter()
            .filter(|(prefix, _)| model.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len());

        match (custom, builtin) {
            (Some((cp, ct)), Some((bp, _))) if cp.len() >= bp.len() => Some(ct.as_str()),
            (_, Some((_, bt))) => Some(*bt),
            (Some((_, ct)), None) => Some(ct.as_str()),
            (None, None) => None,
        }
    }
}

/// Sequential relay identifier source (`R001`, `R002`, ...).
///
/// Thread-safe so one allocator can back a whole batch run.
#[derive(Debug)]
pub struct RelayIdAllocator {
    next: AtomicU64,
}

impl Default for RelayIdAllocator {
    fn default() -> Self {
        Self { next: AtomicU64::new(1) }
    }
}

impl RelayIdAllocator {
    pub fn next_id(&self) -> String {
        let number = self.next.fetch_add(1, Ordering::Relaxed);
        format!("R{number:03}")
    }
}

/// Builds the final [`RelayRecord`] for one document.
#[derive(Debug, Default)]
pub struct RelayMetadataNormalizer {
    type_table: RelayTypeTable,
}

impl RelayMetadataNormalizer {
    /// Add a site-specific model-prefix mapping to the type table.
    pub fn with_relay_type(
        mut self,
        prefix: impl Into<String>,
        relay_type: impl Into<String>,
    ) -> Self {
        self.type_table.insert(prefix, relay_type);
        self
    }

    /// Fuse the classified document and filename metadata. Returns the
    /// record plus any warnings raised during fusion.
    pub fn normalize(
        &self,
        relay_id: String,
        profile: Profile,
        filename: &FilenameMetadata,
        classified: &Classified,
    ) -> (RelayRecord, Vec<String>) {
        let mut warnings = Vec::new();

        let model = classified
            .model_type
            .clone()
            .or_else(|| filename.model.clone())
            .or_else(|| classified.model_number.clone())
            .or_else(|| {
                (profile == Profile::SepamS40).then(|| "SEPAM S40".to_string())
            });

        let relay_type = match model.as_deref().and_then(|model| self.type_table.lookup(model)) {
            Some(relay_type) => relay_type.to_string(),
            None => {
                warnings.push(match &model {
                    Some(model) => format!("model '{model}' has no application-type mapping"),
                    None => "no relay model identified".to_string(),
                });
                "Unknown type".to_string()
            }
        };

        let first_vt = classified.voltage_transformers.first();
        let voltage_class_kv = first_vt.map(|vt| vt.primary / 1000.0);
        let vt_defined = first_vt.is_some();

        let record = RelayRecord {
            relay_id,
            manufacturer: profile.manufacturer().to_string(),
            model,
            relay_type,
            substation_code: filename.substation_code.clone(),
            // Location tokens come from the filename first; the plant
            // reference inside the document is free text and only fills
            // the gap when no filename grammar matched.
            bay_identifier: filename
                .bay_identifier
                .clone()
                .or_else(|| classified.plant_reference.clone()),
            panel_type: filename.panel_type.clone(),
            ansi_code: filename.ansi_code.clone(),
            config_date: filename.config_date,
            voltage_class_kv,
            frequency_hz: classified.frequency_hz,
            software_version: classified.software_version.clone(),
            serial_number: classified.serial_number.clone(),
            vt_defined,
            vt_enabled: first_vt.and_then(|vt| vt.enabled),
            voltage_source: if vt_defined {
                VoltageSource::Doc
            } else {
                VoltageSource::Unknown
            },
            // Binary by design: a VT reading either defines the voltage
            // class or nothing does.
            confidence: vt_defined.then_some(1.0),
        };

        (record, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransformerKind, VoltageTransformerReading};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_table_longest_prefix() {
        let table = RelayTypeTable::default();
        assert_eq!(table.lookup("P122"), Some("Overcurrent"));
        assert_eq!(table.lookup("P143317B2M0520J"), Some("Feeder"));
        // Family fallback for unlisted members.
        assert_eq!(table.lookup("P127"), Some("Overcurrent"));
        assert_eq!(table.lookup("SEPAM S40"), Some("Feeder"));
        assert_eq!(table.lookup("P645"), None);
    }

    #[test]
    fn test_type_table_custom_entries_override() {
        let mut table = RelayTypeTable::default();
        table.insert("P645", "Transformer");
        table.insert("P122", "Custom overcurrent");

        assert_eq!(table.lookup("P645"), Some("Transformer"));
        // Same prefix length as the built-in: custom wins.
        assert_eq!(table.lookup("P122"), Some("Custom overcurrent"));
        // Longer built-in prefixes still win over short custom ones.
        assert_eq!(table.lookup("P123"), Some("Overcurrent"));
    }

    #[test]
    fn test_id_allocator_sequence() {
        let ids = RelayIdAllocator::default();
        assert_eq!(ids.next_id(), "R001");
        assert_eq!(ids.next_id(), "R002");
        assert_eq!(ids.next_id(), "R003");
    }

    #[test]
    fn test_voltage_class_only_from_vt_reading() {
        let normalizer = RelayMetadataNormalizer::default();
        let mut classified = Classified::default();

        let (record, _) = normalizer.normalize(
            "R001".to_string(),
            Profile::EasergyVoltage,
            &FilenameMetadata::default(),
            &classified,
        );
        assert_eq!(record.voltage_class_kv, None);
        assert_eq!(record.voltage_source, VoltageSource::Unknown);
        assert_eq!(record.confidence, None);
        assert!(!record.vt_defined);

        classified.voltage_transformers.push(VoltageTransformerReading {
            kind: TransformerKind::Main,
            primary: 13800.0,
            secondary: 115.0,
            ratio: Some(120.0),
            enabled: None,
        });
        let (record, _) = normalizer.normalize(
            "R002".to_string(),
            Profile::EasergyVoltage,
            &FilenameMetadata::default(),
            &classified,
        );
        assert_eq!(record.voltage_class_kv, Some(13.8));
        assert_eq!(record.voltage_source, VoltageSource::Doc);
        assert_eq!(record.confidence, Some(1.0));
        assert!(record.vt_defined);
    }

    #[test]
    fn test_model_priority_doc_over_filename() {
        let normalizer = RelayMetadataNormalizer::default();
        let mut classified = Classified::default();
        classified.model_type = Some("P122".to_string());

        let filename = FilenameMetadata {
            model: Some("P123".to_string()),
            ..FilenameMetadata::default()
        };
        let (record, warnings) = normalizer.normalize(
            "R001".to_string(),
            Profile::EasergyCurrent,
            &filename,
            &classified,
        );
        assert_eq!(record.model.as_deref(), Some("P122"));
        assert_eq!(record.relay_type, "Overcurrent");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_model_warns() {
        let normalizer = RelayMetadataNormalizer::default();
        let (record, warnings) = normalizer.normalize(
            "R001".to_string(),
            Profile::MiComAgile,
            &FilenameMetadata::default(),
            &Classified::default(),
        );
        assert_eq!(record.relay_type, "Unknown type");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no relay model"));
    }

    #[test]
    fn test_sepam_model_fallback() {
        let normalizer = RelayMetadataNormalizer::default();
        let (record, _) = normalizer.normalize(
            "R001".to_string(),
            Profile::SepamS40,
            &FilenameMetadata::default(),
            &Classified::default(),
        );
        assert_eq!(record.model.as_deref(), Some("SEPAM S40"));
        assert_eq!(record.relay_type, "Feeder");
        assert_eq!(record.manufacturer, "SCHNEIDER ELECTRIC");
    }
}
