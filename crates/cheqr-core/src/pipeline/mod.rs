//! Per-page record assembly.
//!
//! The pipeline drives one page at a time: call the OCR backend under a
//! bounded wait, reconcile entities with pattern fallback, resolve the
//! party identity, and package the result. Pages are independent - a
//! timeout or backend failure degrades its own page and never the
//! document.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::backend::{BackendResponse, OcrBackend};
use crate::error::{BackendError, StoreError};
use crate::extract::Reconciler;
use crate::models::{
    CheqrConfig, ChequeField, NewCheque, PageImage, PageResult, ProcessingStatus,
};
use crate::party::PartyResolver;
use crate::store::ChequeStore;

/// Longest thumbnail edge for degraded-page references.
const THUMBNAIL_EDGE: u32 = 160;

/// Orchestrates extraction, party resolution and persistence.
///
/// Constructed once at process start with its collaborators injected;
/// the backend handle is shared and never mutated.
pub struct ChequePipeline {
    backend: Arc<dyn OcrBackend>,
    store: Arc<dyn ChequeStore>,
    resolver: PartyResolver,
    reconciler: Reconciler,
    timeout: Duration,
}

impl ChequePipeline {
    pub fn new(
        backend: Arc<dyn OcrBackend>,
        store: Arc<dyn ChequeStore>,
        config: &CheqrConfig,
    ) -> Self {
        Self {
            backend,
            resolver: PartyResolver::new(store.clone(), &config.store),
            store,
            reconciler: Reconciler::new(config.extraction.clone()),
            timeout: Duration::from_secs(config.backend.timeout_secs),
        }
    }

    /// Process every page of a document.
    ///
    /// Pages run concurrently (one in-flight backend call each) and results
    /// come back in source page order. Every submitted page yields a
    /// result; failures are page-scoped.
    pub async fn process_document(&self, pages: &[PageImage]) -> Vec<PageResult> {
        info!(pages = pages.len(), "processing document");
        join_all(pages.iter().map(|page| self.process_page(page))).await
    }

    /// Process a single page.
    pub async fn process_page(&self, page: &PageImage) -> PageResult {
        let call = self.backend.analyze(&page.bytes, &page.mime);
        let response = match tokio::time::timeout(self.timeout, call).await {
            Err(_) => {
                let e = BackendError::Timeout(self.timeout.as_secs());
                warn!(page = page.page_number, error = %e, "degrading page");
                return PageResult::degraded(page.page_number, thumbnail_reference(&page.bytes));
            }
            Ok(Err(BackendError::Malformed {
                reason,
                raw_text: Some(text),
            })) => {
                // Unrecognized shape but the text survived: pattern-only
                // extraction still beats an empty page.
                warn!(page = page.page_number, %reason, "malformed backend response, using recovered text");
                BackendResponse::RawTextOnly(text)
            }
            Ok(Err(e)) => {
                warn!(page = page.page_number, error = %e, "backend call failed, degrading page");
                return PageResult::degraded(page.page_number, thumbnail_reference(&page.bytes));
            }
            Ok(Ok(response)) => response,
        };

        let content = response.into_content();
        let fields = self.reconciler.reconcile(&content);

        let account = fields
            .value(ChequeField::AccountNumber)
            .unwrap_or("")
            .to_string();
        let party_code = match self.resolver.resolve(&account) {
            Ok(code) => code,
            Err(e) => {
                warn!(page = page.page_number, error = %e, "party resolution failed");
                None
            }
        };

        debug!(
            page = page.page_number,
            review_fields = fields.review_count(),
            party_code = ?party_code,
            "page assembled"
        );

        PageResult {
            page_number: page.page_number,
            processing_status: ProcessingStatus::Ok,
            fields,
            party_code,
            image_reference: BASE64.encode(&page.bytes),
            raw_text: content.raw_text,
        }
    }

    /// Persist a (possibly client-edited) sequence of page results.
    ///
    /// This is the separate, explicit save step; party records are created
    /// inside each cheque's insert transaction.
    pub fn persist(&self, pages: &[PageResult]) -> Result<Vec<i64>, StoreError> {
        let mut ids = Vec::with_capacity(pages.len());
        for page in pages {
            ids.push(self.store.insert_cheque_and_maybe_party(&NewCheque::from(page))?);
        }
        info!(saved = ids.len(), "persisted page results");
        Ok(ids)
    }
}

/// Downscaled reference for a page whose processing failed; empty when the
/// image itself cannot be decoded.
fn thumbnail_reference(bytes: &[u8]) -> String {
    let Ok(img) = image::load_from_memory(bytes) else {
        return String::new();
    };
    let thumb = img.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE);
    let mut png = Vec::new();
    if thumb
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .is_err()
    {
        return String::new();
    }
    BASE64.encode(&png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Entity;
    use crate::models::StoreConfig;
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    const SCENARIO_TEXT: &str = "STATE BANK OF INDIA\nPay RAMESH KUMAR or bearer\nRupees Five Thousand only\nIFSC: SBIN0001234\n123456789012\n000123";

    /// Test backend driven by the page bytes: `hang` never answers, `fail`
    /// errors, `malformed` loses its structure but keeps text, anything
    /// else gets the canned response.
    struct ScriptedBackend {
        response: BackendResponse,
    }

    #[async_trait]
    impl OcrBackend for ScriptedBackend {
        async fn analyze(&self, image: &[u8], _mime: &str) -> Result<BackendResponse, BackendError> {
            match image {
                b"hang" => std::future::pending().await,
                b"fail" => Err(BackendError::Unavailable("boom".to_string())),
                b"malformed" => Err(BackendError::Malformed {
                    reason: "no candidates".to_string(),
                    raw_text: Some(SCENARIO_TEXT.to_string()),
                }),
                _ => Ok(self.response.clone()),
            }
        }
    }

    fn pipeline_with(response: BackendResponse) -> ChequePipeline {
        let store = Arc::new(SqliteStore::open_in_memory(&StoreConfig::default()).unwrap());
        ChequePipeline::new(
            Arc::new(ScriptedBackend { response }),
            store,
            &CheqrConfig::default(),
        )
    }

    fn page(number: u32, bytes: &[u8]) -> PageImage {
        PageImage {
            page_number: number,
            bytes: bytes.to_vec(),
            mime: "image/png".to_string(),
        }
    }

    fn scenario_response() -> BackendResponse {
        BackendResponse::EntityList {
            text: SCENARIO_TEXT.to_string(),
            entities: vec![Entity {
                label: "bank_name".to_string(),
                text: "STATE BANK OF INDIA".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_page_assembly() {
        let pipeline = pipeline_with(scenario_response());
        let result = pipeline.process_page(&page(1, b"scan")).await;

        assert_eq!(result.processing_status, ProcessingStatus::Ok);
        assert_eq!(result.page_number, 1);
        assert_eq!(
            result.fields.value(ChequeField::BankName),
            Some("STATE BANK OF INDIA")
        );
        assert_eq!(result.fields.value(ChequeField::Payer), Some("RAMESH KUMAR"));
        assert_eq!(result.raw_text, SCENARIO_TEXT);
        assert_eq!(result.image_reference, BASE64.encode(b"scan"));

        let code = result.party_code.unwrap();
        assert_eq!(code.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_only_its_page() {
        let pipeline = pipeline_with(scenario_response());
        let pages = vec![page(1, b"hang"), page(2, b"scan")];

        let results = pipeline.process_document(&pages).await;
        assert_eq!(results.len(), 2);

        // The hung page degrades with no field data...
        assert_eq!(results[0].page_number, 1);
        assert_eq!(results[0].processing_status, ProcessingStatus::Error);
        assert_eq!(results[0].party_code, None);
        for field in ChequeField::ALL {
            assert!(!results[0].fields.is_filled(field));
        }

        // ...while its sibling still returns normally, in order.
        assert_eq!(results[1].page_number, 2);
        assert_eq!(results[1].processing_status, ProcessingStatus::Ok);
        assert_eq!(
            results[1].fields.value(ChequeField::BankName),
            Some("STATE BANK OF INDIA")
        );
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_page() {
        let pipeline = pipeline_with(scenario_response());
        let result = pipeline.process_page(&page(1, b"fail")).await;
        assert_eq!(result.processing_status, ProcessingStatus::Error);
        assert!(result.raw_text.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_response_falls_back_to_patterns() {
        let pipeline = pipeline_with(scenario_response());
        let result = pipeline.process_page(&page(1, b"malformed")).await;

        // Recovered text keeps the page alive: pattern-only extraction.
        assert_eq!(result.processing_status, ProcessingStatus::Ok);
        assert_eq!(result.fields.value(ChequeField::IfscCode), Some("SBIN0001234"));
        assert_eq!(
            result.fields.value(ChequeField::AccountNumber),
            Some("123456789012")
        );
        assert!(result.fields.get(ChequeField::IfscCode).needs_review);
    }

    #[tokio::test]
    async fn test_scored_map_confidences_flow_through() {
        let mut map = BTreeMap::new();
        map.insert(
            "bank_name".to_string(),
            crate::backend::ScoredField {
                value: Some("HDFC BANK".to_string()),
                confidence: 95.0,
            },
        );
        map.insert(
            "payer".to_string(),
            crate::backend::ScoredField {
                value: Some("Not Available".to_string()),
                confidence: 90.0,
            },
        );
        let pipeline = pipeline_with(BackendResponse::ScoredFieldMap(map));

        let result = pipeline.process_page(&page(1, b"scan")).await;
        let bank = result.fields.get(ChequeField::BankName);
        assert_eq!(bank.confidence, 0.95);
        assert!(!bank.needs_review);

        // Sentinel values stay flagged no matter how confident the backend.
        assert!(result.fields.get(ChequeField::Payer).needs_review);
    }

    #[tokio::test]
    async fn test_persist_converges_same_account_pages() {
        let store = Arc::new(SqliteStore::open_in_memory(&StoreConfig::default()).unwrap());
        let pipeline = ChequePipeline::new(
            Arc::new(ScriptedBackend {
                response: scenario_response(),
            }),
            store.clone(),
            &CheqrConfig::default(),
        );

        let pages = vec![page(1, b"scan"), page(2, b"scan")];
        let results = pipeline.process_document(&pages).await;
        let ids = pipeline.persist(&results).unwrap();
        assert_eq!(ids.len(), 2);

        // Both cheques carry the same account; the store converges them to
        // one durable party code.
        let stored = store.list_cheques().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].party_code, stored[1].party_code);
        assert!(stored[0].party_code.is_some());
        assert_eq!(
            store.find_party_by_account("123456789012").unwrap(),
            stored[0].party_code
        );
    }
}
