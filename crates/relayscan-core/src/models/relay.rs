//! Typed records for relay hardware and protection settings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Role of a current or voltage transformer within the relay wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformerKind {
    /// Phase (line) measurement.
    Phase,
    /// Earth/ground measurement.
    Ground,
    /// Residual current measurement.
    Residual,
    /// Sensitive earth fault input.
    Sef,
    /// Main voltage input.
    Main,
    /// Auxiliary voltage input.
    Auxiliary,
    /// Neutral voltage displacement input.
    Nvd,
    /// Check-synchronism voltage input.
    CheckSync,
}

impl TransformerKind {
    /// Human-readable label used in warnings and reports.
    pub fn label(&self) -> &'static str {
        match self {
            TransformerKind::Phase => "Phase",
            TransformerKind::Ground => "Ground",
            TransformerKind::Residual => "Residual",
            TransformerKind::Sef => "SEF",
            TransformerKind::Main => "Main",
            TransformerKind::Auxiliary => "Auxiliary",
            TransformerKind::Nvd => "NVD",
            TransformerKind::CheckSync => "Check Sync",
        }
    }
}

/// A current transformer ratio reading (primary/secondary in amperes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTransformerReading {
    /// Measurement role of this CT.
    pub kind: TransformerKind,

    /// Primary rating in amperes.
    pub primary: f64,

    /// Secondary rating in amperes.
    pub secondary: f64,

    /// `primary / secondary`; `None` when the secondary is zero.
    pub ratio: Option<f64>,

    /// Enabled flag when the document carries one; `None` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A voltage transformer ratio reading (primary/secondary in volts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageTransformerReading {
    /// Measurement role of this VT.
    pub kind: TransformerKind,

    /// Primary rating in volts.
    pub primary: f64,

    /// Secondary rating in volts.
    pub secondary: f64,

    /// `primary / secondary`; `None` when the secondary is zero.
    pub ratio: Option<f64>,

    /// Enabled flag when the document carries one; `None` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A protection function recovered from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionFunctionRecord {
    /// Source code or section name the function was read from.
    pub source_code: String,

    /// Function label as written in the document.
    pub function_label: String,

    /// Inferred ANSI device code; `"Unknown"` when no mapping applies.
    ///
    /// The code is heuristic, not authoritative: `"Unknown"` is a valid
    /// terminal value, never an error.
    pub ansi_code: String,

    /// Whether the function is switched on in this configuration.
    pub is_enabled: bool,

    /// Setpoint parameters associated with the function.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub setpoints: BTreeMap<String, String>,
}

/// Where the voltage class of a [`RelayRecord`] came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoltageSource {
    /// Derived from a VT primary reading in the document.
    Doc,
    /// No VT reading was available.
    #[default]
    Unknown,
}

/// Normalized per-document relay identity and electrical context.
///
/// Every field is derived purely from filename tokens and extracted
/// parameters; document ordering has no influence here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayRecord {
    /// Stable sequential identifier (`R001`, `R002`, ...).
    pub relay_id: String,

    /// Manufacturer resolved from the document profile.
    pub manufacturer: String,

    /// Relay model (e.g. `P122`, `SEPAM S40`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Application type from the model lookup table; `"Unknown type"`
    /// when the model is not mapped.
    pub relay_type: String,

    /// Substation code from the filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substation_code: Option<String>,

    /// Bus/bay identifier from the filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bay_identifier: Option<String>,

    /// Panel-type code from the filename (MF, MK, TR, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<String>,

    /// ANSI/element code embedded in the filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansi_code: Option<String>,

    /// Configuration date embedded in the filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_date: Option<NaiveDate>,

    /// Voltage class in kV, derived only from a VT primary reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage_class_kv: Option<f64>,

    /// Network frequency in Hz when the document states one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<f64>,

    /// Relay firmware/software version when stated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,

    /// Hardware serial number (SEPAM repere trailing token).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    /// True when at least one VT reading was extracted.
    pub vt_defined: bool,

    /// Enabled flag of the first VT reading, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vt_enabled: Option<bool>,

    /// Provenance of `voltage_class_kv`.
    pub voltage_source: VoltageSource,

    /// Fixed 1.0 when a VT reading defines the voltage class, `None`
    /// otherwise. Deliberately binary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}
