//! Validation report for a classified document.

use serde::{Deserialize, Serialize};

/// Completeness and structure metrics over the classified output.
///
/// Warnings are advisory: they flag suspicious documents for review but
/// never stop processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of raw parameter records recovered from the document.
    pub total_parameters: usize,

    /// Number of current transformer readings.
    pub ct_count: usize,

    /// Number of voltage transformer readings.
    pub vt_count: usize,

    /// Number of protection function records.
    pub protection_count: usize,

    /// Number of protection functions that are enabled.
    pub enabled_protection_count: usize,

    /// Heuristic percentage of the profile's expected parameter count
    /// that was actually recovered, clipped to `[0, 100]`.
    pub completeness_score: f64,

    /// Structural warnings collected during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
