//! Extraction engine for protection relay configuration exports.
//!
//! Turns settings files exported from relay engineering tools (MiCOM S1
//! Agile and Easergy Studio PDF text, SEPAM `.S40` INI files) into
//! normalized relay records: CT/VT ratios, protection functions with
//! ANSI device codes, network frequency, and identity metadata fused
//! from the document and its filename.
//!
//! The pipeline is deliberately forgiving: only a missing format
//! signature or a completely empty scan aborts a document, everything
//! else degrades into warnings on the validation report.

pub mod classify;
pub mod convert;
pub mod error;
pub mod extractor;
pub mod models;
pub mod normalize;
pub mod profile;
pub mod scan;
pub mod validate;

pub use classify::{Classified, DomainClassifier};
pub use error::{ExtractError, Result};
pub use extractor::{ExtractionBundle, RelayExtractor};
pub use models::{
    CurrentTransformerReading, ProtectionFunctionRecord, RawParameter, RelayRecord,
    TransformerKind, ValidationReport, VoltageTransformerReading,
};
pub use profile::{resolve_profile, Profile};
pub use scan::LineScanner;
