use axum::{extract::FromRequestParts, extract::Path, http::request::Parts, RequestPartsExt};

use crate::errors::{api_error::ApiError, service_error::ServiceError};

const MAX_TICKER_LEN: usize = 10;

/// Upper-cased ticker taken from the `{ticker}` path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker(pub String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let ticker = raw.trim().to_uppercase();

        if ticker.is_empty() {
            return Err(ServiceError::InvalidRequest("Ticker is required".into()));
        }

        if ticker.len() > MAX_TICKER_LEN
            || !ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ServiceError::InvalidRequest(format!(
                "Invalid ticker symbol: {ticker}"
            )));
        }

        Ok(Ticker(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Ticker
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = parts.extract::<Path<String>>().await.map_err(|err| {
            ApiError::without_ticker(ServiceError::InvalidRequest(err.body_text()), "Invalid ticker")
        })?;

        Ticker::parse(&raw).map_err(|source| ApiError::new(source, "Invalid ticker", raw))
    }
}
