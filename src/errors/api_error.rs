use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use super::service_error::ServiceError;

/// A `ServiceError` bound to the route that raised it and the ticker it concerned.
#[derive(Debug)]
pub struct ApiError {
    pub source: ServiceError,
    pub context: &'static str,
    pub ticker: Option<String>,
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ticker: Option<String>,
}

impl ApiError {
    pub fn new(source: ServiceError, context: &'static str, ticker: impl Into<String>) -> Self {
        Self {
            source,
            context,
            ticker: Some(ticker.into()),
        }
    }

    pub fn without_ticker(source: ServiceError, context: &'static str) -> Self {
        Self {
            source,
            context,
            ticker: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.source {
            ServiceError::MissingCredential(_) | ServiceError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self.source {
            ServiceError::MissingCredential(msg)
            | ServiceError::InvalidCredential(msg)
            | ServiceError::InvalidRequest(msg) => msg.clone(),
            _ => self.context.to_owned(),
        };

        if status.is_server_error() {
            error!(
                ticker = ?self.ticker,
                error = %self.source,
                "{}", self.context
            );
        }

        let body = ApiErrorResponse {
            error: message,
            ticker: self.ticker,
        };

        (status, Json(body)).into_response()
    }
}

/// Attaches route context to a `ServiceError` result.
pub trait WithTicker<T> {
    fn for_ticker(self, context: &'static str, ticker: &str) -> Result<T, ApiError>;
}

impl<T> WithTicker<T> for Result<T, ServiceError> {
    fn for_ticker(self, context: &'static str, ticker: &str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::new(source, context, ticker))
    }
}
