//! Model selection and dispatch across the two LLM providers.

use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::service_error::ServiceError;

use super::gemini::GeminiClient;
use super::openai::OpenAiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelType {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "gpt-4")]
    Gpt4,
}

impl ModelType {
    fn from_selector(selector: &str) -> Option<Self> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "gpt-4" | "gpt4" => Some(ModelType::Gpt4),
            "gemini" => Some(ModelType::Gemini),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    gemini: GeminiClient,
    openai: OpenAiClient,
    gemini_api_key: Option<String>,
    openai_api_key: Option<String>,
}

impl LlmClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gemini: GeminiClient::new(config),
            openai: OpenAiClient::new(config),
            gemini_api_key: config.gemini_api_key.clone(),
            openai_api_key: config.openai_api_key.clone(),
        }
    }

    /// Gemini when it has a key, GPT-4 otherwise.
    pub fn default_model(&self) -> ModelType {
        if self.gemini_api_key.is_some() {
            ModelType::Gemini
        } else {
            ModelType::Gpt4
        }
    }

    /// Unrecognised selectors fall back to the default model.
    pub fn resolve_model(&self, selector: Option<&str>) -> ModelType {
        selector
            .and_then(ModelType::from_selector)
            .unwrap_or_else(|| self.default_model())
    }

    /// Sends `prompt` to `model` and returns the raw completion text.
    ///
    /// GPT-4 uses `openai_token` when the caller supplied one and the
    /// configured key otherwise.
    pub async fn complete(
        &self,
        model: ModelType,
        prompt: &str,
        openai_token: Option<&str>,
    ) -> Result<String, ServiceError> {
        info!(?model, prompt_len = prompt.len(), "Dispatching LLM request");

        match model {
            ModelType::Gemini => {
                let key = self.gemini_api_key.as_deref().ok_or_else(|| {
                    ServiceError::MissingCredential(
                        "Gemini API key is not configured".to_string(),
                    )
                })?;
                self.gemini.complete(key, prompt).await
            }
            ModelType::Gpt4 => {
                let key = openai_token
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .or(self.openai_api_key.as_deref())
                    .ok_or_else(|| {
                        ServiceError::MissingCredential(
                            "OpenAI API token is required for GPT-4".to_string(),
                        )
                    })?;
                self.openai.complete(key, prompt).await
            }
        }
    }
}
