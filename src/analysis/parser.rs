//! # LLM Response Parsing
//!
//! Turns free-form provider text into validated results. Provider text is
//! untrusted: it is trimmed before matching, and any shape mismatch fails
//! the whole parse with `MalformedLlmResponse` rather than falling back to
//! a default.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::service_error::ServiceError;

/// Tolerates markdown emphasis or heading marks around the marker. The score
/// must be a whole number ending the line, optionally written as `n/100`.
static RISK_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[\s*#_]*RISK_SCORE[\s*_]*:[ \t*_]*(-?\d+)[ \t*_]*(?:/[ \t]*100)?[ \t\r*_]*$")
        .expect("valid regex")
});

static EXPLANATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?msi)^[\s*#_]*EXPLANATION[\s*_]*:[\s*_]*(.*)").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub risk_score: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerEntry {
    pub ticker: String,
    pub name: String,
}

/// Removes a surrounding markdown code fence (```` ```json ... ``` ````) if present.
///
/// The fence may sit on its own lines or wrap the payload on a single line.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. `json`) only when the payload clearly starts after it.
    let after_info =
        rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let inner = match after_info.chars().next() {
        Some(c) if c.is_whitespace() || c == '[' || c == '{' => after_info,
        None => after_info,
        Some(_) => rest,
    };
    let inner = inner.trim_end();
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Parses a `RISK_SCORE: <n>` / `EXPLANATION: <text>` response.
///
/// # Errors
/// `MalformedLlmResponse` if either marker is missing, the explanation is
/// empty, or the score falls outside `0..=100`.
pub fn parse_risk_response(text: &str) -> Result<RiskAnalysis, ServiceError> {
    let text = strip_code_fences(text);

    let score = RISK_SCORE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ServiceError::MalformedLlmResponse("missing RISK_SCORE marker".into()))?
        .as_str();

    let risk_score = score
        .parse::<i64>()
        .ok()
        .filter(|s| (0..=100).contains(s))
        .and_then(|s| u8::try_from(s).ok())
        .ok_or_else(|| {
            ServiceError::MalformedLlmResponse(format!("risk score {score} is not within 0-100"))
        })?;

    let explanation_match = EXPLANATION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ServiceError::MalformedLlmResponse("missing EXPLANATION marker".into()))?;

    // The explanation runs to the end of the text unless the score line follows it.
    let mut explanation = explanation_match.as_str();
    if let Some(score_after) = RISK_SCORE_RE.find(explanation) {
        explanation = &explanation[..score_after.start()];
    }
    let explanation = explanation.trim();
    let explanation = explanation.strip_suffix("```").unwrap_or(explanation);
    let explanation = explanation.trim().trim_end_matches(['*', '_']).trim();

    if explanation.is_empty() {
        return Err(ServiceError::MalformedLlmResponse(
            "EXPLANATION marker has no text".into(),
        ));
    }

    Ok(RiskAnalysis {
        risk_score,
        explanation: explanation.to_string(),
    })
}

/// Parses a JSON array of `{ticker, name}` objects, optionally code-fenced.
///
/// # Errors
/// `MalformedLlmResponse` if the text is not exactly such an array. No
/// partial recovery is attempted.
pub fn parse_peers_response(text: &str) -> Result<Vec<PeerEntry>, ServiceError> {
    let json = strip_code_fences(text);

    let peers: Vec<PeerEntry> = serde_json::from_str(json).map_err(|e| {
        ServiceError::MalformedLlmResponse(format!("peer list is not a JSON array: {e}"))
    })?;

    Ok(peers
        .into_iter()
        .map(|peer| PeerEntry {
            ticker: peer.ticker.trim().to_uppercase(),
            name: peer.name.trim().to_string(),
        })
        .collect())
}
