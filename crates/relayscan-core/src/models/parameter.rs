//! Raw parameter records produced by the line scanner.

use serde::{Deserialize, Serialize};

/// A single coded record recovered from a document.
///
/// Ordering within a document is significant: continuation lines always
/// attach to the most recently emitted record. The continuation list is
/// append-only during a single scan and frozen afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParameter {
    /// Numeric code (PDF exports) or section name (INI dialect).
    pub code_or_section: String,

    /// Parameter name as written in the document.
    pub key: String,

    /// Verbatim value text, may be empty.
    pub value: String,

    /// 1-based line number of the record in the source document.
    pub line_number: usize,

    /// True when continuation lines were attached to this record.
    pub is_continuation_block: bool,

    /// Non-record lines attached to this record, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub continuation: Vec<String>,
}

impl RawParameter {
    /// Create a record with no continuation lines.
    pub fn new(
        code_or_section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        line_number: usize,
    ) -> Self {
        Self {
            code_or_section: code_or_section.into(),
            key: key.into(),
            value: value.into(),
            line_number,
            is_continuation_block: false,
            continuation: Vec::new(),
        }
    }
}
