//! Generative-model OCR backend client.
//!
//! Sends the page image with an extraction prompt and parses the model's
//! reply into a confidence-scored field map. Model output is recovered
//! defensively: code fences are stripped and the outermost JSON object is
//! located before parsing, since models decorate their answers despite
//! instructions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendResponse, OcrBackend, ScoredField};
use crate::error::BackendError;

/// The prompt instructing the model to extract cheque fields as scored JSON.
const EXTRACTION_PROMPT: &str = r#"Analyze the provided cheque image and extract the following fields.
Return ONLY a JSON object, no markdown fences, no commentary, matching:

{
  "bank_name": {"value": "string or null", "confidence": 0-100},
  "date": {"value": "string or null", "confidence": 0-100},
  "ifsc_code": {"value": "string or null", "confidence": 0-100},
  "amount_in_words": {"value": "string or null", "confidence": 0-100},
  "amount_in_digits": {"value": "string or null", "confidence": 0-100},
  "payer": {"value": "string or null", "confidence": 0-100},
  "account_number": {"value": "string or null", "confidence": 0-100},
  "cheque_number": {"value": "string or null", "confidence": 0-100},
  "transaction_id": {"value": "string or null", "confidence": 0-100},
  "transaction_message": {"value": "string or null", "confidence": 0-100}
}

Notes:
- The IFSC code is 4 uppercase letters followed by 7 characters.
- The cheque number is a 6-digit group on the MICR line.
- Pay special attention to handwritten fields (amount, date, payer).
- If a field cannot be read, set its value to null and confidence to 0."#;

/// Client for a generative-model extraction endpoint.
pub struct GenerativeOcrClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Part {
    Text(String),
    InlineData { mime_type: String, data: String },
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerativeOcrClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl OcrBackend for GenerativeOcrClient {
    async fn analyze(&self, image: &[u8], mime: &str) -> Result<BackendResponse, BackendError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(EXTRACTION_PROMPT.to_string()),
                    Part::InlineData {
                        mime_type: mime.to_string(),
                        data: BASE64.encode(image),
                    },
                ],
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

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| BackendError::Malformed {
                reason: e.to_string(),
                raw_text: None,
            })?;

        let reply = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| BackendError::Malformed {
                reason: "no candidates in response".to_string(),
                raw_text: None,
            })?;

        debug!(reply_len = reply.len(), "generative backend reply");

        let map = parse_scored_fields(&reply).map_err(|reason| BackendError::Malformed {
            reason,
            raw_text: Some(reply.clone()),
        })?;

        Ok(BackendResponse::ScoredFieldMap(map))
    }
}

/// Parse a model reply into the scored field map.
fn parse_scored_fields(reply: &str) -> Result<BTreeMap<String, ScoredField>, String> {
    let stripped = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let json = extract_json_object(stripped)?;
    serde_json::from_str(json).map_err(|e| format!("field map parse failed: {e}"))
}

/// Locate the outermost JSON object in a reply that may carry surrounding
/// prose or reasoning text.
fn extract_json_object(s: &str) -> Result<&str, String> {
    let start = s.find('{').ok_or("no '{' in model reply")?;
    let end = s.rfind('}').ok_or("no '}' in model reply")?;
    if end <= start {
        return Err("malformed JSON in model reply".to_string());
    }
    Ok(&s[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json_reply() {
        let reply = r#"{"bank_name": {"value": "HDFC BANK", "confidence": 95}}"#;
        let map = parse_scored_fields(reply).unwrap();
        assert_eq!(map["bank_name"].value.as_deref(), Some("HDFC BANK"));
        assert_eq!(map["bank_name"].confidence, 95.0);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"cheque_number\": {\"value\": \"000123\", \"confidence\": 88}}\n```";
        let map = parse_scored_fields(reply).unwrap();
        assert_eq!(map["cheque_number"].value.as_deref(), Some("000123"));
    }

    #[test]
    fn test_parse_reply_with_surrounding_prose() {
        let reply = "Here is the extracted data:\n{\"payer\": {\"value\": null, \"confidence\": 0}}\nLet me know if you need more.";
        let map = parse_scored_fields(reply).unwrap();
        assert_eq!(map["payer"].value, None);
    }

    #[test]
    fn test_parse_rejects_non_json_reply() {
        assert!(parse_scored_fields("I could not read the image.").is_err());
    }
}
