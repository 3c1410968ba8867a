//! OCR backend abstraction.
//!
//! A backend consumes single-page image bytes and answers in one of three
//! shapes: typed entities plus text, a confidence-scored field map, or raw
//! recognized text only. Each shape has an explicit adapter into the common
//! [`PageContent`] the reconciler consumes.

mod document;
mod generative;
mod vision;

pub use document::DocumentOcrClient;
pub use generative::GenerativeOcrClient;
pub use vision::VisionOcrClient;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{BackendError, CheqrError};
use crate::models::{BackendConfig, BackendKind, ChequeField};

/// An OCR backend, consumed as a black box.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Analyze a single page image.
    async fn analyze(&self, image: &[u8], mime: &str) -> Result<BackendResponse, BackendError>;
}

/// A structured (type, text) pair reported directly by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Backend-specific type label.
    pub label: String,
    /// Recognized text for the entity.
    pub text: String,
}

/// One field as reported by a backend that scores its own output.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ScoredField {
    pub value: Option<String>,
    pub confidence: f32,
}

/// The three response shapes a backend may produce.
#[derive(Debug, Clone)]
pub enum BackendResponse {
    /// Typed entities alongside the page's recognized text.
    EntityList { text: String, entities: Vec<Entity> },
    /// A flat field map with per-field confidence scores.
    ScoredFieldMap(BTreeMap<String, ScoredField>),
    /// Raw recognized text only.
    RawTextOnly(String),
}

/// A backend entity mapped onto the canonical field enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntity {
    pub field: ChequeField,
    pub value: String,
    /// Backend-reported confidence, when the backend scores its output.
    pub confidence: Option<f32>,
}

/// The normalized `(raw_text, entities)` pair all shapes reduce to.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub raw_text: String,
    pub entities: Vec<ScoredEntity>,
}

impl BackendResponse {
    /// Reduce the response to the common shape, one adapter per variant.
    pub fn into_content(self) -> PageContent {
        match self {
            BackendResponse::EntityList { text, entities } => entity_list_content(text, entities),
            BackendResponse::ScoredFieldMap(map) => scored_map_content(map),
            BackendResponse::RawTextOnly(text) => PageContent {
                raw_text: text,
                entities: Vec::new(),
            },
        }
    }
}

fn entity_list_content(text: String, entities: Vec<Entity>) -> PageContent {
    let mut mapped = Vec::with_capacity(entities.len());
    for entity in entities {
        match ChequeField::from_label(&entity.label) {
            Some(field) => mapped.push(ScoredEntity {
                field,
                value: entity.text,
                confidence: None,
            }),
            None => debug!(label = %entity.label, "dropping unrecognized entity label"),
        }
    }
    PageContent {
        raw_text: text,
        entities: mapped,
    }
}

fn scored_map_content(map: BTreeMap<String, ScoredField>) -> PageContent {
    let mut entities = Vec::with_capacity(map.len());
    for (label, scored) in map {
        let Some(field) = ChequeField::from_label(&label) else {
            debug!(label = %label, "dropping unrecognized field label");
            continue;
        };
        let Some(value) = scored.value else {
            continue;
        };
        entities.push(ScoredEntity {
            field,
            value,
            confidence: Some(normalize_confidence(scored.confidence)),
        });
    }
    PageContent {
        raw_text: String::new(),
        entities,
    }
}

/// Backends report confidence on a 0-1 or 0-100 scale; store 0-1.
fn normalize_confidence(raw: f32) -> f32 {
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    scaled.clamp(0.0, 1.0)
}

/// Construct the configured backend client.
///
/// The API key is resolved from the environment once, at construction; the
/// returned handle is meant to be built at process start and reused.
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn OcrBackend>, CheqrError> {
    let api_key = std::env::var(&config.api_key_env).map_err(|_| {
        CheqrError::Config(format!(
            "backend API key not set (expected env var {})",
            config.api_key_env
        ))
    })?;

    let backend: Arc<dyn OcrBackend> = match config.kind {
        BackendKind::Document => Arc::new(DocumentOcrClient::new(&config.endpoint, &api_key)),
        BackendKind::Vision => Arc::new(VisionOcrClient::new(&config.endpoint, &api_key)),
        BackendKind::Generative => Arc::new(GenerativeOcrClient::new(&config.endpoint, &api_key)),
    };
    Ok(backend)
}
