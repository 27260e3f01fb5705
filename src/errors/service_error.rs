use thiserror::Error;

/// Failures raised by the provider clients, the parser and the request extractors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream call timed out")]
    UpstreamTimeout,

    #[error("no data found: {0}")]
    NotFound(String),

    #[error("malformed LLM response: {0}")]
    MalformedLlmResponse(String),

    #[error("{0}")]
    MissingCredential(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::UpstreamTimeout
        } else {
            ServiceError::UpstreamUnavailable(err.to_string())
        }
    }
}
