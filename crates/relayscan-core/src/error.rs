//! Error types for the relayscan-core library.
//!
//! The engine distinguishes two hard failures from everything else: a
//! document whose manufacturer cannot be identified, and a document that
//! yields no parameter records at all. Every other miss (unparsable ratio,
//! unmapped ANSI label, unmapped relay model) is a soft outcome reported
//! through sentinel values and [`ValidationReport`](crate::models::report::ValidationReport)
//! warnings, never an error.

use thiserror::Error;

/// Main error type for the extraction engine.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No manufacturer signature matched the document text or filename.
    ///
    /// Classification cannot proceed without a profile, so this stops
    /// processing of the document.
    #[error("unknown manufacturer: no profile signature matched '{filename}'")]
    UnknownManufacturer {
        /// Name of the offending document.
        filename: String,
    },

    /// The document produced no parameter records at all.
    ///
    /// Raised when the scanner finds nothing to classify, which makes the
    /// rest of the pipeline meaningless for this document.
    #[error("missing required sections: {profile} document produced no parameter records")]
    MissingSections {
        /// Label of the profile that was resolved for the document.
        profile: &'static str,
    },
}

/// Result type for the relayscan-core library.
pub type Result<T> = std::result::Result<T, ExtractError>;
