//! Canonical cheque field schema.
//!
//! Every processed page produces a [`FieldSet`] holding one [`FieldValue`]
//! per enumerated field - unresolved fields stay at their default rather
//! than being omitted, so downstream consumers never see a partially
//! shaped record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Confidence below which a field is flagged for manual review.
pub const REVIEW_THRESHOLD: f32 = 0.70;

/// Placeholder values some backends emit instead of leaving a field blank.
pub const SENTINEL_VALUES: &[&str] = &["Not Available", "Requires Manual Verification"];

/// The closed enumeration of recognized cheque fields.
///
/// Variant order is the canonical display/storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeField {
    BankName,
    Date,
    IfscCode,
    AmountInWords,
    AmountInDigits,
    Payer,
    AccountNumber,
    ChequeNumber,
    TransactionId,
    TransactionMessage,
}

impl ChequeField {
    /// All fields in canonical order.
    pub const ALL: [ChequeField; 10] = [
        ChequeField::BankName,
        ChequeField::Date,
        ChequeField::IfscCode,
        ChequeField::AmountInWords,
        ChequeField::AmountInDigits,
        ChequeField::Payer,
        ChequeField::AccountNumber,
        ChequeField::ChequeNumber,
        ChequeField::TransactionId,
        ChequeField::TransactionMessage,
    ];

    /// Snake-case name used in JSON output and database columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChequeField::BankName => "bank_name",
            ChequeField::Date => "date",
            ChequeField::IfscCode => "ifsc_code",
            ChequeField::AmountInWords => "amount_in_words",
            ChequeField::AmountInDigits => "amount_in_digits",
            ChequeField::Payer => "payer",
            ChequeField::AccountNumber => "account_number",
            ChequeField::ChequeNumber => "cheque_number",
            ChequeField::TransactionId => "transaction_id",
            ChequeField::TransactionMessage => "transaction_message",
        }
    }

    /// Map a backend entity type label (lower-cased) onto the enumeration.
    ///
    /// Covers the label aliases the different backends report for the same
    /// field; unknown labels return `None` and are dropped by the caller.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "bank_name" | "bank" => Some(ChequeField::BankName),
            "date" | "cheque_date" => Some(ChequeField::Date),
            "ifsc_code" | "ifsc" => Some(ChequeField::IfscCode),
            "amount_in_words" => Some(ChequeField::AmountInWords),
            "amount_in_digits" | "amount" | "cheque_amount" => Some(ChequeField::AmountInDigits),
            "payer" | "payee" | "paid_by" | "party_name" => Some(ChequeField::Payer),
            "account_number" => Some(ChequeField::AccountNumber),
            "cheque_number" => Some(ChequeField::ChequeNumber),
            "transaction_id" | "utr" | "bank_reference_number" => Some(ChequeField::TransactionId),
            "transaction_message" | "message_in_transaction" => {
                Some(ChequeField::TransactionMessage)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ChequeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted cheque attribute with its extraction reliability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Extracted text, `None` when nothing was found.
    pub value: Option<String>,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,

    /// Whether the value requires manual review.
    pub needs_review: bool,
}

impl FieldValue {
    /// The default for an unresolved field.
    pub fn empty() -> Self {
        Self {
            value: None,
            confidence: 0.0,
            needs_review: true,
        }
    }

    /// Build a value with `needs_review` derived from the threshold rule.
    pub fn scored(value: impl Into<String>, confidence: f32, threshold: f32) -> Self {
        let value = value.into();
        let needs_review = review_required(Some(value.as_str()), confidence, threshold);
        Self {
            value: Some(value),
            confidence,
            needs_review,
        }
    }

    /// True when no usable text was extracted.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.trim().is_empty())
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

/// The review-flag rule: flagged when confidence is below the threshold or
/// the value is missing, blank, or a known placeholder.
pub fn review_required(value: Option<&str>, confidence: f32, threshold: f32) -> bool {
    let unusable = match value {
        None => true,
        Some(v) => {
            let v = v.trim();
            v.is_empty() || SENTINEL_VALUES.iter().any(|s| v.eq_ignore_ascii_case(s))
        }
    };
    unusable || confidence < threshold
}

/// Ordered mapping from every [`ChequeField`] to its [`FieldValue`].
///
/// Always fully populated: construction and deserialization both guarantee
/// that each enumerated field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldSet {
    fields: BTreeMap<ChequeField, FieldValue>,
}

impl FieldSet {
    /// A field set with every field at its unresolved default.
    pub fn new() -> Self {
        let fields = ChequeField::ALL
            .iter()
            .map(|f| (*f, FieldValue::empty()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: ChequeField) -> &FieldValue {
        // Every field is present by construction.
        &self.fields[&field]
    }

    pub fn set(&mut self, field: ChequeField, value: FieldValue) {
        self.fields.insert(field, value);
    }

    /// Extracted text for a field, if any.
    pub fn value(&self, field: ChequeField) -> Option<&str> {
        self.fields[&field].value.as_deref()
    }

    /// True when the field holds non-blank text.
    pub fn is_filled(&self, field: ChequeField) -> bool {
        !self.fields[&field].is_blank()
    }

    /// Fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ChequeField, &FieldValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }

    /// Number of fields flagged for review.
    pub fn review_count(&self) -> usize {
        self.fields.values().filter(|v| v.needs_review).count()
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Client-edited JSON may omit fields; re-fill defaults so the
        // fully-populated invariant survives the round trip.
        let partial = BTreeMap::<ChequeField, FieldValue>::deserialize(deserializer)?;
        let mut set = FieldSet::new();
        for (field, value) in partial {
            set.fields.insert(field, value);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_field_set_has_every_field() {
        let set = FieldSet::new();
        for field in ChequeField::ALL {
            let v = set.get(field);
            assert_eq!(v.value, None);
            assert!(v.needs_review);
        }
        assert_eq!(set.iter().count(), ChequeField::ALL.len());
    }

    #[test]
    fn test_canonical_order_is_stable() {
        let set = FieldSet::new();
        let order: Vec<ChequeField> = set.iter().map(|(f, _)| f).collect();
        assert_eq!(order, ChequeField::ALL.to_vec());
    }

    #[test]
    fn test_review_flag_rule() {
        // Below threshold -> flagged even with a value.
        assert!(review_required(Some("SBIN0001234"), 0.5, REVIEW_THRESHOLD));
        // At/above threshold with a real value -> not flagged.
        assert!(!review_required(Some("SBIN0001234"), 0.70, REVIEW_THRESHOLD));
        assert!(!review_required(Some("SBIN0001234"), 0.95, REVIEW_THRESHOLD));
        // Missing or blank -> flagged regardless of confidence.
        assert!(review_required(None, 0.99, REVIEW_THRESHOLD));
        assert!(review_required(Some("   "), 0.99, REVIEW_THRESHOLD));
        // Sentinel values -> flagged regardless of confidence.
        assert!(review_required(Some("Not Available"), 0.99, REVIEW_THRESHOLD));
        assert!(review_required(
            Some("requires manual verification"),
            0.99,
            REVIEW_THRESHOLD
        ));
    }

    #[test]
    fn test_scored_value_computes_review_flag() {
        let ok = FieldValue::scored("STATE BANK OF INDIA", 0.9, REVIEW_THRESHOLD);
        assert!(!ok.needs_review);

        let low = FieldValue::scored("STATE BANK OF INDIA", 0.55, REVIEW_THRESHOLD);
        assert!(low.needs_review);
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(ChequeField::from_label("BANK_NAME"), Some(ChequeField::BankName));
        assert_eq!(ChequeField::from_label("amount"), Some(ChequeField::AmountInDigits));
        assert_eq!(
            ChequeField::from_label("cheque_amount"),
            Some(ChequeField::AmountInDigits)
        );
        assert_eq!(ChequeField::from_label("paid_by"), Some(ChequeField::Payer));
        assert_eq!(
            ChequeField::from_label("message_in_transaction"),
            Some(ChequeField::TransactionMessage)
        );
        assert_eq!(ChequeField::from_label("routing_number"), None);
    }

    #[test]
    fn test_deserialize_refills_missing_fields() {
        let json = r#"{"bank_name": {"value": "HDFC BANK", "confidence": 0.9, "needs_review": false}}"#;
        let set: FieldSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.value(ChequeField::BankName), Some("HDFC BANK"));
        // Omitted fields come back at their defaults instead of vanishing.
        for field in ChequeField::ALL {
            if field != ChequeField::BankName {
                assert_eq!(set.get(field), &FieldValue::empty());
            }
        }
    }

    #[test]
    fn test_serialize_uses_snake_case_keys() {
        let mut set = FieldSet::new();
        set.set(
            ChequeField::IfscCode,
            FieldValue::scored("SBIN0001234", 0.9, REVIEW_THRESHOLD),
        );
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["ifsc_code"]["value"], "SBIN0001234");
        assert!(json.get("amount_in_words").is_some());
    }
}
