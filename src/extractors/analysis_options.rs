use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::Deserialize;

use crate::errors::{api_error::ApiError, service_error::ServiceError};

/// Optional JSON body of the analysis routes. An empty body means defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default, rename = "modelType")]
    pub model_type: Option<String>,
    #[serde(default, rename = "openAIToken", alias = "openaiToken")]
    pub openai_token: Option<String>,
}

impl AnalysisOptions {
    pub fn from_body(body: &[u8]) -> Result<Self, ServiceError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| ServiceError::InvalidRequest(format!("Invalid request body: {e}")))
    }
}

impl<S> FromRequest<S> for AnalysisOptions
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|err| {
            ApiError::without_ticker(
                ServiceError::InvalidRequest(err.body_text()),
                "Invalid request body",
            )
        })?;

        AnalysisOptions::from_body(&body)
            .map_err(|source| ApiError::without_ticker(source, "Invalid request body"))
    }
}
