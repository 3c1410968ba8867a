//! Document-understanding backend client.
//!
//! Posts the page image to a document processor endpoint and reads back the
//! document-level text plus typed entities.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendResponse, Entity, OcrBackend};
use crate::error::BackendError;

/// Client for a document-understanding OCR processor.
pub struct DocumentOcrClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest {
    raw_document: RawDocument,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    content: String,
    mime_type: String,
}

#[derive(Deserialize)]
struct ProcessResponse {
    document: ProcessedDocument,
}

#[derive(Deserialize)]
struct ProcessedDocument {
    #[serde(default)]
    text: String,
    #[serde(default)]
    entities: Vec<DocumentEntity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentEntity {
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default)]
    mention_text: String,
}

impl DocumentOcrClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl OcrBackend for DocumentOcrClient {
    async fn analyze(&self, image: &[u8], mime: &str) -> Result<BackendResponse, BackendError> {
        let request = ProcessRequest {
            raw_document: RawDocument {
                content: BASE64.encode(image),
                mime_type: mime.to_string(),
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Unavailable(format!("HTTP {status}: {body}")));
        }

        let parsed: ProcessResponse = response.json().await.map_err(|e| BackendError::Malformed {
            reason: e.to_string(),
            raw_text: None,
        })?;

        debug!(
            entities = parsed.document.entities.len(),
            text_len = parsed.document.text.len(),
            "document backend response"
        );

        let entities = parsed
            .document
            .entities
            .into_iter()
            .map(|e| Entity {
                label: e.entity_type,
                text: e.mention_text,
            })
            .collect();

        Ok(BackendResponse::EntityList {
            text: parsed.document.text,
            entities,
        })
    }
}
