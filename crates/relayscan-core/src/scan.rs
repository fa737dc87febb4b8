//! Single-pass line scanner turning document text into raw parameters.
//!
//! The scanner is an iterator over lines with one record of lookbehind:
//! a matched line becomes the pending record, and subsequent lines that
//! match no grammar attach to it as continuation text. Page markers,
//! horizontal rules, and export banners are dropped before any grammar
//! is tried, so they can never break a continuation block.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::RawParameter;
use crate::profile::Profile;

lazy_static! {
    // "0120: Line CT primary: 1500"
    static ref EASERGY_CODED: Regex = Regex::new(r"^(\d{4}):\s*(.+?):\s*(.*)$").unwrap();
    static ref EASERGY_BARE: Regex = Regex::new(r"^(\d{4}):\s*(\S.*?)\s*$").unwrap();

    // "0A.07: Phase CT Primary: 600"
    static ref MICOM_CODED: Regex =
        Regex::new(r"^([0-9A-F]{2}\.[0-9A-F]{2}):\s*(.+?):\s*(.*)$").unwrap();
    static ref MICOM_BARE: Regex =
        Regex::new(r"^([0-9A-F]{2}\.[0-9A-F]{2}):\s*(\S.*?)\s*$").unwrap();

    // "Main VT Primary: 13800V" (uncoded PDF lines, first colon splits)
    static ref PLAIN_KEYED: Regex =
        Regex::new(r"^([A-Za-z][A-Za-z0-9 ()'/.&=-]{1,39}?)\s*:\s*(.*)$").unwrap();

    static ref INI_SECTION: Regex = Regex::new(r"^\[([^\]]+)\]\s*$").unwrap();

    static ref PAGE_MARKER: Regex = Regex::new(r"(?i)^\s*page\s+\d+(\s+of\s+\d+)?\s*$").unwrap();
    static ref RULE_LINE: Regex = Regex::new(r"^[-=_*]{3,}\s*$").unwrap();
}

/// Export banner fragments stripped as noise.
const BANNERS: &[&str] = &["MiCOM S1 Agile", "Easergy Studio"];

/// Streaming scanner over one document's lines.
pub struct LineScanner<'a> {
    profile: Profile,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    section: Option<String>,
    pending: Option<RawParameter>,
}

impl<'a> LineScanner<'a> {
    pub fn new(profile: Profile, text: &'a str) -> Self {
        Self {
            profile,
            lines: text.lines().enumerate(),
            section: None,
            pending: None,
        }
    }

    fn is_noise(line: &str) -> bool {
        PAGE_MARKER.is_match(line)
            || RULE_LINE.is_match(line)
            || BANNERS.iter().any(|banner| line.contains(banner))
    }

    /// Try the grammars of a coded PDF profile against one line.
    fn match_coded(&self, line: &str, line_number: usize) -> Option<RawParameter> {
        let (coded, bare) = match self.profile {
            Profile::MiComAgile => (&*MICOM_CODED, &*MICOM_BARE),
            Profile::EasergyCurrent | Profile::EasergyVoltage => {
                (&*EASERGY_CODED, &*EASERGY_BARE)
            }
            Profile::SepamS40 => return None,
        };

        if let Some(caps) = coded.captures(line) {
            return Some(RawParameter::new(&caps[1], caps[2].trim(), caps[3].trim(), line_number));
        }
        if let Some(caps) = bare.captures(line) {
            return Some(RawParameter::new(&caps[1], caps[2].trim(), "", line_number));
        }
        // Uncoded keyed lines appear in every PDF export's header block.
        if let Some(caps) = PLAIN_KEYED.captures(line) {
            return Some(RawParameter::new("", caps[1].trim(), caps[2].trim(), line_number));
        }
        None
    }

    /// Advance through an INI-dialect line, returning a flushed record
    /// when a section boundary or a new key closes one.
    fn step_ini(&mut self, line: &str, line_number: usize) -> Option<RawParameter> {
        if line.starts_with(';') || line.starts_with('#') {
            return None;
        }
        if let Some(caps) = INI_SECTION.captures(line) {
            self.section = Some(caps[1].to_string());
            return self.pending.take();
        }
        if let Some((key, value)) = line.split_once('=') {
            // Keys outside any section have no addressable home.
            let section = self.section.clone()?;
            let record =
                RawParameter::new(section, key.trim(), value.trim(), line_number);
            return std::mem::replace(&mut self.pending, Some(record));
        }
        // Wrapped values continue the open record, same contract as the
        // PDF dialects.
        if let Some(pending) = self.pending.as_mut() {
            pending.is_continuation_block = true;
            pending.continuation.push(line.to_string());
        }
        None
    }
}

impl Iterator for LineScanner<'_> {
    type Item = RawParameter;

    fn next(&mut self) -> Option<RawParameter> {
        while let Some((index, raw_line)) = self.lines.next() {
            let line = raw_line.trim_end();
            let line_number = index + 1;

            if line.trim().is_empty() || Self::is_noise(line.trim()) {
                continue;
            }

            if self.profile.is_ini() {
                if let Some(flushed) = self.step_ini(line.trim(), line_number) {
                    return Some(flushed);
                }
                continue;
            }

            if let Some(record) = self.match_coded(line.trim(), line_number) {
                if let Some(flushed) = std::mem::replace(&mut self.pending, Some(record)) {
                    return Some(flushed);
                }
                continue;
            }

            // Anything else continues the open record.
            if let Some(pending) = self.pending.as_mut() {
                pending.is_continuation_block = true;
                pending.continuation.push(line.trim().to_string());
            }
        }

        self.pending.take()
    }
}

/// Scan a full document into its ordered raw parameters.
pub fn scan(profile: Profile, text: &str) -> Vec<RawParameter> {
    LineScanner::new(profile, text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_easergy_coded_lines() {
        let text = "0120: Line CT primary: 1500\n0121: Line CT sec: 5\n";
        let params = scan(Profile::EasergyCurrent, text);

        assert_eq!(params.len(), 2);
        assert_eq!(params[0].code_or_section, "0120");
        assert_eq!(params[0].key, "Line CT primary");
        assert_eq!(params[0].value, "1500");
        assert_eq!(params[0].line_number, 1);
        assert_eq!(params[1].value, "5");
    }

    #[test]
    fn test_scan_bare_code_line_has_empty_value() {
        let params = scan(Profile::EasergyCurrent, "0400: AUTOMAT. CTRL\n");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].key, "AUTOMAT. CTRL");
        assert_eq!(params[0].value, "");
    }

    #[test]
    fn test_scan_micom_hex_codes_and_plain_keys() {
        let text = "Model Number: P143317B2M0520J\n0A.07: Phase CT Primary: 600\n";
        let params = scan(Profile::MiComAgile, text);

        assert_eq!(params.len(), 2);
        assert_eq!(params[0].code_or_section, "");
        assert_eq!(params[0].key, "Model Number");
        assert_eq!(params[1].code_or_section, "0A.07");
        assert_eq!(params[1].value, "600");
    }

    #[test]
    fn test_scan_attaches_continuation_lines() {
        let text = concat!(
            "09.01: Protection Status: 09.0B: Thermal Overload: Enabled\n",
            "09.0C: Short Circuit: Enabled | 09.0D: Earth Fault 1: Disabled\n",
        );
        // The second line is itself a coded line, so craft one that is not.
        let text2 = concat!(
            "00.05: Description: Feeder bay 2B\n",
            "continued description text\n",
            "more text\n",
            "00.06: Plant Reference: MF-2B\n",
        );
        let params = scan(Profile::MiComAgile, text2);
        assert_eq!(params.len(), 2);
        assert!(params[0].is_continuation_block);
        assert_eq!(
            params[0].continuation,
            vec!["continued description text", "more text"]
        );
        assert!(!params[1].is_continuation_block);

        // Coded continuation lines stay separate records.
        let params = scan(Profile::MiComAgile, text);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_scan_skips_noise_without_breaking_blocks() {
        let text = concat!(
            "00.05: Description: Feeder bay\n",
            "Page 3 of 12\n",
            "----------\n",
            "MiCOM S1 Agile export\n",
            "still the description\n",
        );
        let params = scan(Profile::MiComAgile, text);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].continuation, vec!["still the description"]);
    }

    #[test]
    fn test_scan_ini_sections_and_keys() {
        let text = concat!(
            "; settings export\n",
            "orphan=dropped\n",
            "[Sepam_Caracteristiques]\n",
            "i_nominal=200\n",
            "calibre_TC=1\n",
            "[Protection50_51]\n",
            "activite_1=1\n",
        );
        let params = scan(Profile::SepamS40, text);

        assert_eq!(params.len(), 3);
        assert_eq!(params[0].code_or_section, "Sepam_Caracteristiques");
        assert_eq!(params[0].key, "i_nominal");
        assert_eq!(params[0].value, "200");
        assert_eq!(params[2].code_or_section, "Protection50_51");
        assert_eq!(params[2].key, "activite_1");
    }

    #[test]
    fn test_scan_ini_wrapped_value_becomes_continuation() {
        let text = concat!(
            "[Sepam_ConfigMaterielle]\n",
            "repere=00-MF-12\n",
            "wrapped tail of the value\n",
            "modele=S40\n",
        );
        let params = scan(Profile::SepamS40, text);

        assert_eq!(params.len(), 2);
        assert!(params[0].is_continuation_block);
        assert_eq!(params[0].continuation, vec!["wrapped tail of the value"]);
        assert_eq!(params[1].key, "modele");
        assert!(!params[1].is_continuation_block);
    }

    #[test]
    fn test_scan_empty_document() {
        assert!(scan(Profile::EasergyCurrent, "").is_empty());
        assert!(scan(Profile::SepamS40, "\n\n; only comments\n").is_empty());
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let text = "\n\n0120: Line CT primary: 1500\n";
        let params = scan(Profile::EasergyCurrent, text);
        assert_eq!(params[0].line_number, 3);
    }
}
