//! Merges backend entities with pattern-extracted fallback values.

use tracing::debug;

use super::PatternExtractor;
use crate::backend::PageContent;
use crate::models::{FieldSet, FieldValue, config::ExtractionConfig};

/// Per-page reconciliation of the two extraction sources.
///
/// Precedence is an ordering contract, not a scoring contest: a non-empty
/// backend entity always wins, and pattern rules only run for fields the
/// backend left empty. Backend-reported confidences are preserved verbatim;
/// `needs_review` is always recomputed from the threshold rule.
pub struct Reconciler {
    config: ExtractionConfig,
    patterns: PatternExtractor,
}

impl Reconciler {
    pub fn new(config: ExtractionConfig) -> Self {
        let patterns = PatternExtractor::new(config.clone());
        Self { config, patterns }
    }

    /// Produce the fully-populated field set for one page.
    pub fn reconcile(&self, content: &PageContent) -> FieldSet {
        let mut fields = FieldSet::new();

        for entity in &content.entities {
            if entity.value.trim().is_empty() {
                continue;
            }
            if fields.is_filled(entity.field) {
                // Backends occasionally report duplicate labels; the first
                // mapped entity wins.
                debug!(field = %entity.field, "ignoring duplicate backend entity");
                continue;
            }
            let confidence = entity.confidence.unwrap_or(self.config.entity_confidence);
            fields.set(
                entity.field,
                FieldValue::scored(
                    entity.value.clone(),
                    confidence,
                    self.config.review_threshold,
                ),
            );
        }

        self.patterns.fill_missing(&mut fields, &content.raw_text);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScoredEntity;
    use crate::models::ChequeField;
    use pretty_assertions::assert_eq;

    fn reconciler() -> Reconciler {
        Reconciler::new(ExtractionConfig::default())
    }

    const SCENARIO_TEXT: &str = "STATE BANK OF INDIA\nPay RAMESH KUMAR or bearer\nRupees Five Thousand only\nIFSC: SBIN0001234\n123456789012\n000123";

    #[test]
    fn test_pattern_only_scenario() {
        let content = PageContent {
            raw_text: SCENARIO_TEXT.to_string(),
            entities: Vec::new(),
        };
        let fields = reconciler().reconcile(&content);

        assert_eq!(fields.value(ChequeField::BankName), Some("STATE BANK OF INDIA"));
        assert_eq!(fields.value(ChequeField::Payer), Some("RAMESH KUMAR"));
        assert_eq!(fields.value(ChequeField::AmountInWords), Some("Five Thousand"));
        assert_eq!(fields.value(ChequeField::IfscCode), Some("SBIN0001234"));
        assert_eq!(fields.value(ChequeField::AccountNumber), Some("123456789012"));
        assert_eq!(fields.value(ChequeField::ChequeNumber), Some("000123"));
    }

    #[test]
    fn test_backend_entity_wins_over_pattern() {
        // The pattern extractor would find "STATE BANK OF INDIA"; the
        // backend's value must win verbatim regardless.
        let content = PageContent {
            raw_text: SCENARIO_TEXT.to_string(),
            entities: vec![ScoredEntity {
                field: ChequeField::BankName,
                value: "BANK OF BARODA".to_string(),
                confidence: None,
            }],
        };
        let fields = reconciler().reconcile(&content);

        assert_eq!(fields.value(ChequeField::BankName), Some("BANK OF BARODA"));
        // Fields the backend left empty still fall back to patterns.
        assert_eq!(fields.value(ChequeField::Payer), Some("RAMESH KUMAR"));
    }

    #[test]
    fn test_empty_backend_value_falls_through_to_pattern() {
        let content = PageContent {
            raw_text: SCENARIO_TEXT.to_string(),
            entities: vec![ScoredEntity {
                field: ChequeField::IfscCode,
                value: "   ".to_string(),
                confidence: None,
            }],
        };
        let fields = reconciler().reconcile(&content);
        assert_eq!(fields.value(ChequeField::IfscCode), Some("SBIN0001234"));
    }

    #[test]
    fn test_backend_confidence_preserved_review_recomputed() {
        let content = PageContent {
            raw_text: String::new(),
            entities: vec![
                ScoredEntity {
                    field: ChequeField::AmountInDigits,
                    value: "5000".to_string(),
                    confidence: Some(0.95),
                },
                ScoredEntity {
                    field: ChequeField::Date,
                    value: "01/01/2024".to_string(),
                    confidence: Some(0.40),
                },
            ],
        };
        let fields = reconciler().reconcile(&content);

        let amount = fields.get(ChequeField::AmountInDigits);
        assert_eq!(amount.confidence, 0.95);
        assert!(!amount.needs_review);

        // Low backend confidence keeps the review flag regardless of what
        // the backend itself claimed.
        let date = fields.get(ChequeField::Date);
        assert_eq!(date.confidence, 0.40);
        assert!(date.needs_review);
    }

    #[test]
    fn test_unscored_entities_get_default_confidence() {
        let content = PageContent {
            raw_text: String::new(),
            entities: vec![ScoredEntity {
                field: ChequeField::Payer,
                value: "RAMESH KUMAR".to_string(),
                confidence: None,
            }],
        };
        let fields = reconciler().reconcile(&content);
        let payer = fields.get(ChequeField::Payer);
        assert_eq!(payer.confidence, ExtractionConfig::default().entity_confidence);
        assert!(!payer.needs_review);
    }

    #[test]
    fn test_empty_content_yields_fully_shaped_defaults() {
        let fields = reconciler().reconcile(&PageContent::default());
        for field in ChequeField::ALL {
            let v = fields.get(field);
            assert_eq!(v.value, None);
            assert!(v.needs_review);
        }
    }
}
