//! End-to-end extraction pipeline for one document.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::DomainClassifier;
use crate::error::{ExtractError, Result};
use crate::models::{
    CurrentTransformerReading, ProtectionFunctionRecord, RawParameter, RelayRecord,
    ValidationReport, VoltageTransformerReading,
};
use crate::normalize::{RelayIdAllocator, RelayMetadataNormalizer};
use crate::profile::{parse_filename, resolve_profile};
use crate::scan::scan;
use crate::validate::validate;

/// Everything extracted from one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionBundle {
    pub relay: RelayRecord,
    pub current_transformers: Vec<CurrentTransformerReading>,
    pub voltage_transformers: Vec<VoltageTransformerReading>,
    pub protections: Vec<ProtectionFunctionRecord>,
    /// All raw parameters, in document order.
    pub parameters: Vec<RawParameter>,
    pub report: ValidationReport,
}

/// Stateful extractor shared across a batch of documents.
///
/// The only cross-document state is the relay id sequence; extraction of
/// each document is otherwise independent.
#[derive(Debug, Default)]
pub struct RelayExtractor {
    normalizer: RelayMetadataNormalizer,
    ids: RelayIdAllocator,
}

impl RelayExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a site-specific model-prefix to relay-type mapping.
    pub fn with_relay_type(
        mut self,
        prefix: impl Into<String>,
        relay_type: impl Into<String>,
    ) -> Self {
        self.normalizer = self.normalizer.with_relay_type(prefix, relay_type);
        self
    }

    /// Run the full pipeline on one document's text.
    ///
    /// Only two conditions are unrecoverable: no profile signature
    /// matches, or the scan recovers nothing at all. Everything else
    /// degrades into warnings on the report.
    pub fn extract(&self, filename: &str, text: &str) -> Result<ExtractionBundle> {
        let profile = resolve_profile(text, filename)?;
        info!(file = filename, profile = profile.label(), "extracting");

        let filename_meta = parse_filename(filename);
        if filename_meta.is_empty() {
            debug!(file = filename, "filename matches no naming grammar");
        }

        let parameters = scan(profile, text);
        if parameters.is_empty() {
            return Err(ExtractError::MissingSections {
                profile: profile.label(),
            });
        }

        let classified = DomainClassifier::new(profile).classify(parameters);
        let mut report = validate(profile, &classified);

        let (relay, normalize_warnings) = self.normalizer.normalize(
            self.ids.next_id(),
            profile,
            &filename_meta,
            &classified,
        );

        let mut warnings = classified.warnings.clone();
        if filename_meta.is_empty() {
            warnings.push(format!("filename '{filename}' matches no naming grammar"));
        }
        warnings.extend(normalize_warnings);
        warnings.append(&mut report.warnings);
        report.warnings = warnings;

        for warning in &report.warnings {
            warn!(file = filename, "{warning}");
        }

        Ok(ExtractionBundle {
            relay,
            current_transformers: classified.current_transformers,
            voltage_transformers: classified.voltage_transformers,
            protections: classified.protections,
            parameters: classified.parameters,
            report,
        })
    }
}
