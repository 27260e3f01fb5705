use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::service_error::ServiceError;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Google API error envelope, e.g. `{"error": {"status": "INVALID_ARGUMENT", "details": [...]}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Gemini rejects a bad key with `400 INVALID_ARGUMENT`, not `401`.
fn is_invalid_key(body: &str) -> bool {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| {
            envelope
                .error
                .details
                .iter()
                .any(|detail| detail.reason.as_deref() == Some("API_KEY_INVALID"))
        })
        .unwrap_or(false)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_default()
}

/// `generateContent` client for Gemini models.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        }
    }

    pub async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, ServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, "Requesting Gemini content generation");

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(ServiceError::InvalidCredential(
                "Invalid Gemini API key".to_string(),
            ));
        }

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await?;
            if is_invalid_key(&body) {
                return Err(ServiceError::InvalidCredential(
                    "Invalid Gemini API key".to_string(),
                ));
            }
            return Err(ServiceError::UpstreamUnavailable(format!(
                "Gemini rejected the request: {}",
                error_message(&body)
            )));
        }

        let generated = response
            .error_for_status()?
            .json::<GenerateContentResponse>()
            .await?;

        // Candidates may split one answer across several parts.
        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::MalformedLlmResponse(
                "Gemini returned no candidate text".into(),
            ));
        }

        Ok(text)
    }
}
