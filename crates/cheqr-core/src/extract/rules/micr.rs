//! Cheque number rules.
//!
//! The cheque number is the first numeric group of the MICR line when one
//! is present; otherwise the first standalone 6-digit run anywhere on the
//! page is used.

use super::Rule;
use super::patterns::{CHEQUE_STANDALONE, MICR_LINE};
use crate::models::config::ExtractionConfig;

pub(super) static RULES: &[Rule] = &[
    Rule {
        name: "micr-line",
        apply: micr_line,
    },
    Rule {
        name: "standalone-six-digits",
        apply: standalone_six,
    },
];

/// Four delimiter-bounded numeric groups (6+9+6+2 digits); the first group
/// is the cheque number.
fn micr_line(text: &str, _config: &ExtractionConfig) -> Option<String> {
    MICR_LINE.captures(text).map(|caps| caps[1].to_string())
}

/// First standalone 6-digit run.
fn standalone_six(text: &str, _config: &ExtractionConfig) -> Option<String> {
    CHEQUE_STANDALONE
        .captures(text)
        .map(|caps| caps[1].to_string())
}
