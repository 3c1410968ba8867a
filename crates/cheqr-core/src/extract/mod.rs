//! Field extraction: pattern fallback rules and entity reconciliation.

pub mod rules;

mod reconciler;

pub use reconciler::Reconciler;

use tracing::debug;

use crate::models::{ChequeField, FieldSet, FieldValue, config::ExtractionConfig};

/// Stateless pattern-based extractor over raw recognized text.
///
/// Only consulted for fields the backend left empty; every match carries
/// the configured pattern confidence, which by default sits below the
/// review threshold so pattern-derived values stay flagged.
pub struct PatternExtractor {
    config: ExtractionConfig,
}

impl PatternExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Try a single field's rules against the text.
    pub fn extract_field(&self, field: ChequeField, text: &str) -> Option<String> {
        rules::first_match(field, text, &self.config)
    }

    /// Fill every still-unfilled field from the page text.
    pub fn fill_missing(&self, fields: &mut FieldSet, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let confidence = if self.config.trust_pattern_matches {
            self.config.entity_confidence
        } else {
            self.config.pattern_confidence
        };

        for field in ChequeField::ALL {
            if fields.is_filled(field) {
                continue;
            }
            if let Some(value) = self.extract_field(field, text) {
                debug!(field = %field, "pattern fallback match");
                fields.set(
                    field,
                    FieldValue::scored(value, confidence, self.config.review_threshold),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_missing_skips_filled_fields() {
        let config = ExtractionConfig::default();
        let extractor = PatternExtractor::new(config.clone());

        let mut fields = FieldSet::new();
        fields.set(
            ChequeField::BankName,
            FieldValue::scored("AXIS BANK", 0.9, config.review_threshold),
        );

        extractor.fill_missing(&mut fields, "STATE BANK OF INDIA\nPay A or bearer");

        // The already-filled field is untouched; the empty one is filled.
        assert_eq!(fields.value(ChequeField::BankName), Some("AXIS BANK"));
        assert_eq!(fields.value(ChequeField::Payer), Some("A"));
    }

    #[test]
    fn test_pattern_matches_stay_flagged_by_default() {
        let extractor = PatternExtractor::new(ExtractionConfig::default());
        let mut fields = FieldSet::new();
        extractor.fill_missing(&mut fields, "IFSC: SBIN0001234");

        let ifsc = fields.get(ChequeField::IfscCode);
        assert_eq!(ifsc.value.as_deref(), Some("SBIN0001234"));
        assert!(ifsc.needs_review);
    }

    #[test]
    fn test_trusted_pattern_matches_clear_the_flag() {
        let config = ExtractionConfig {
            trust_pattern_matches: true,
            ..ExtractionConfig::default()
        };
        let extractor = PatternExtractor::new(config);

        let mut fields = FieldSet::new();
        extractor.fill_missing(&mut fields, "IFSC: SBIN0001234");
        assert!(!fields.get(ChequeField::IfscCode).needs_review);
    }
}
