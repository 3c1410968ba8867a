//! Page-level and persisted record shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::field::{ChequeField, FieldSet};

/// A single rasterized page awaiting extraction.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Source page number, 1-indexed.
    pub page_number: u32,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Declared MIME type of the image.
    pub mime: String,
}

/// Outcome of processing a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// The page was extracted normally.
    Ok,
    /// The backend call failed or timed out; the page carries no field data.
    Error,
}

/// The per-page result returned to the caller.
///
/// One per rasterized page, in source page order (1-indexed). Degraded
/// pages are still emitted so a multi-page document never loses its
/// successful pages to one failing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Source page number, 1-indexed.
    pub page_number: u32,

    /// Whether extraction succeeded for this page.
    pub processing_status: ProcessingStatus,

    /// Extracted fields; all defaults on a degraded page.
    pub fields: FieldSet,

    /// Stable party identifier for the cheque's account, when resolvable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_code: Option<String>,

    /// Base64-encoded page image (thumbnail only on a degraded page).
    pub image_reference: String,

    /// Raw recognized text the fields were extracted from.
    pub raw_text: String,
}

impl PageResult {
    /// Minimal result for a page whose backend call failed or timed out.
    pub fn degraded(page_number: u32, image_reference: String) -> Self {
        Self {
            page_number,
            processing_status: ProcessingStatus::Error,
            fields: FieldSet::new(),
            party_code: None,
            image_reference,
            raw_text: String::new(),
        }
    }
}

/// A payer identity: one stable code per unique account number.
///
/// Created at first sighting of an account number, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRecord {
    pub party_code: String,
    pub account_number: String,
}

/// A cheque record about to be persisted.
#[derive(Debug, Clone)]
pub struct NewCheque {
    pub fields: FieldSet,
    /// Candidate party code from resolution; the store converges to the
    /// earlier writer's code if the account already exists.
    pub party_code: Option<String>,
    pub image_reference: String,
}

impl From<&PageResult> for NewCheque {
    fn from(page: &PageResult) -> Self {
        Self {
            fields: page.fields.clone(),
            party_code: page.party_code.clone(),
            image_reference: page.image_reference.clone(),
        }
    }
}

/// The durable form of a saved cheque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCheque {
    /// Auto-assigned store identifier.
    pub id: i64,

    /// Persisted field values, keyed by canonical field name.
    pub fields: BTreeMap<ChequeField, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_code: Option<String>,

    pub image_reference: String,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_page_has_no_field_data() {
        let page = PageResult::degraded(3, "thumb".to_string());
        assert_eq!(page.page_number, 3);
        assert_eq!(page.processing_status, ProcessingStatus::Error);
        assert_eq!(page.party_code, None);
        assert!(page.raw_text.is_empty());
        for field in ChequeField::ALL {
            assert!(!page.fields.is_filled(field));
        }
    }

    #[test]
    fn test_processing_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProcessingStatus::Error).unwrap(),
            "\"error\""
        );
        assert_eq!(serde_json::to_string(&ProcessingStatus::Ok).unwrap(), "\"ok\"");
    }
}
