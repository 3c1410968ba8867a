//! IFSC code rules.

use super::Rule;
use super::patterns::{IFSC_LABELED, IFSC_STANDALONE};
use crate::models::config::ExtractionConfig;

pub(super) static RULES: &[Rule] = &[
    Rule {
        name: "ifsc-labeled",
        apply: labeled,
    },
    Rule {
        name: "ifsc-standalone",
        apply: standalone,
    },
];

/// Code preceded by the literal "IFSC" label.
fn labeled(text: &str, _config: &ExtractionConfig) -> Option<String> {
    IFSC_LABELED
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Bare 4-letter + 7-digit token anywhere in the text.
fn standalone(text: &str, _config: &ExtractionConfig) -> Option<String> {
    IFSC_STANDALONE
        .captures(text)
        .map(|caps| caps[1].to_string())
}
