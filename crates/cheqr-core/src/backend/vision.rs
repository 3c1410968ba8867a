//! Vision OCR backend client.
//!
//! Text-detection only: the response carries a full-text annotation and no
//! structured entities, so every field comes from pattern fallback.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendResponse, OcrBackend};
use crate::error::BackendError;

/// Client for a vision OCR text-detection service.
pub struct VisionOcrClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateEntry>,
}

#[derive(Serialize)]
struct AnnotateEntry {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    full_text_annotation: Option<TextAnnotation>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
}

impl VisionOcrClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl OcrBackend for VisionOcrClient {
    async fn analyze(&self, image: &[u8], _mime: &str) -> Result<BackendResponse, BackendError> {
        let request = AnnotateRequest {
            requests: vec![AnnotateEntry {
                image: ImageContent {
                    content: BASE64.encode(image),
                },
                features: vec![Feature {
                    feature_type: "DOCUMENT_TEXT_DETECTION",
                }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Unavailable(format!("HTTP {status}: {body}")));
        }

        let parsed: AnnotateResponse =
            response.json().await.map_err(|e| BackendError::Malformed {
                reason: e.to_string(),
                raw_text: None,
            })?;

        let text = parsed
            .responses
            .into_iter()
            .next()
            .and_then(|r| r.full_text_annotation)
            .map(|a| a.text)
            .ok_or_else(|| BackendError::Malformed {
                reason: "no text annotation in response".to_string(),
                raw_text: None,
            })?;

        debug!(text_len = text.len(), "vision backend response");
        Ok(BackendResponse::RawTextOnly(text))
    }
}
