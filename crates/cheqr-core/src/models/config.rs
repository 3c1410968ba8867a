//! Configuration structures for the cheque pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::field::REVIEW_THRESHOLD;

/// Main configuration for the cheqr pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheqrConfig {
    /// OCR backend configuration.
    pub backend: BackendConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Record store configuration.
    pub store: StoreConfig,
}

/// Which OCR backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Document-understanding processor returning typed entities.
    Document,
    /// Vision OCR returning raw recognized text.
    Vision,
    /// Generative model returning a confidence-scored field map.
    Generative,
}

/// OCR backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend variant to use.
    pub kind: BackendKind,

    /// Service endpoint URL.
    pub endpoint: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Bound on each per-page backend call, in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Document,
            endpoint: "http://localhost:5050/v1/process".to_string(),
            api_key_env: "CHEQR_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Confidence below which a field is flagged for review.
    pub review_threshold: f32,

    /// Confidence assigned to backend entities that come without a score.
    pub entity_confidence: f32,

    /// Confidence assigned to pattern-matched fallback values.
    pub pattern_confidence: f32,

    /// Treat a successful pattern match like a backend entity instead of
    /// keeping it below the review threshold.
    pub trust_pattern_matches: bool,

    /// Minimum digit-run length for account-number candidates (9, or 12 in
    /// stricter deployments).
    pub min_account_digits: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            review_threshold: REVIEW_THRESHOLD,
            entity_confidence: 0.90,
            pattern_confidence: 0.55,
            trust_pattern_matches: false,
            min_account_digits: 9,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path.
    pub db_path: PathBuf,

    /// Length of generated party codes.
    pub party_code_len: usize,

    /// Bound on regeneration attempts when a party code collides.
    pub max_code_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("cheqr.db"),
            party_code_len: 10,
            max_code_attempts: 16,
        }
    }
}

impl CheqrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
