//! # LLM Analysis Handlers
//!
//! Sentiment, risk and peer-discovery routes. Each one gathers provider
//! data, builds a prompt, sends it to the selected model and, for risk and
//! peers, parses the reply into structured fields.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::analysis::parser::{self, PeerEntry};
use crate::analysis::prompts;
use crate::clients::finnhub::NewsArticle;
use crate::clients::llm::ModelType;
use crate::errors::api_error::{ApiError, WithTicker};
use crate::extractors::{analysis_options::AnalysisOptions, ticker::Ticker};
use crate::state::AppState;

//
// ----------- Data Structures -----------
//

#[derive(Debug, Serialize, Deserialize)]
pub struct NewsLink {
    pub url: String,
    pub headline: String,
    pub summary: String,
}

impl From<&NewsArticle> for NewsLink {
    fn from(article: &NewsArticle) -> Self {
        NewsLink {
            url: article.url.clone(),
            headline: article.headline.clone(),
            summary: article.summary.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResponse {
    pub sentiment: String,
    pub prompt: String,
    pub model_type: ModelType,
    pub news_links: Vec<NewsLink>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResponse {
    pub risk_score: u8,
    pub explanation: String,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeersResponse {
    pub peers: Vec<PeerEntry>,
}

//
// ----------- Handlers -----------
//

/// News only enriches the prompt, so a news failure degrades to no articles.
async fn recent_news(state: &AppState, ticker: &Ticker) -> Vec<NewsArticle> {
    match state.finnhub.company_news(ticker.as_str()).await {
        Ok(news) => news
            .into_iter()
            .take(prompts::MAX_NEWS_ITEMS)
            .collect(),
        Err(e) => {
            warn!(ticker = %ticker.as_str(), error = %e, "Continuing without news");
            Vec::new()
        }
    }
}

/// # Errors
/// - `400` when GPT-4 is selected and no OpenAI token is available.
/// - `401` when the provider rejects the credential.
/// - `500` for provider failures or timeouts.
#[instrument(skip(state, options))]
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    ticker: Ticker,
    options: AnalysisOptions,
) -> Result<Json<SentimentResponse>, ApiError> {
    let context = "Failed to analyze market sentiment";
    let model = state.llm.resolve_model(options.model_type.as_deref());
    info!(ticker = %ticker.as_str(), ?model, "Received sentiment request.");

    let profile = state
        .finnhub
        .company_profile(ticker.as_str())
        .await
        .for_ticker(context, ticker.as_str())?;
    let news = recent_news(&state, &ticker).await;

    let prompt = prompts::sentiment_prompt(ticker.as_str(), &profile, &news);
    let sentiment = state
        .llm
        .complete(model, &prompt, options.openai_token.as_deref())
        .await
        .for_ticker(context, ticker.as_str())?;

    Ok(Json(SentimentResponse {
        sentiment: sentiment.trim().to_string(),
        prompt,
        model_type: model,
        news_links: news.iter().map(NewsLink::from).collect(),
    }))
}

#[instrument(skip(state, options))]
pub async fn analyze_risk(
    State(state): State<AppState>,
    ticker: Ticker,
    options: AnalysisOptions,
) -> Result<Json<RiskResponse>, ApiError> {
    let context = "Failed to analyze investment risk";
    let model = state.llm.resolve_model(options.model_type.as_deref());
    info!(ticker = %ticker.as_str(), ?model, "Received risk request.");

    let profile = state
        .finnhub
        .company_profile(ticker.as_str())
        .await
        .for_ticker(context, ticker.as_str())?;

    let quote = match state.finnhub.quote(ticker.as_str()).await {
        Ok(quote) => Some(quote),
        Err(e) => {
            warn!(ticker = %ticker.as_str(), error = %e, "Continuing without quote");
            None
        }
    };
    let news = recent_news(&state, &ticker).await;

    let prompt = prompts::risk_prompt(ticker.as_str(), &profile, quote.as_ref(), &news);
    let raw = state
        .llm
        .complete(model, &prompt, options.openai_token.as_deref())
        .await
        .for_ticker(context, ticker.as_str())?;

    let analysis = parser::parse_risk_response(&raw).for_ticker(context, ticker.as_str())?;

    Ok(Json(RiskResponse {
        risk_score: analysis.risk_score,
        explanation: analysis.explanation,
        prompt,
    }))
}

#[instrument(skip(state, options))]
pub async fn find_peers(
    State(state): State<AppState>,
    ticker: Ticker,
    options: AnalysisOptions,
) -> Result<Json<PeersResponse>, ApiError> {
    let context = "Failed to fetch peer companies";
    let model = state.llm.resolve_model(options.model_type.as_deref());
    info!(ticker = %ticker.as_str(), ?model, "Received peers request.");

    let profile = state
        .finnhub
        .company_profile(ticker.as_str())
        .await
        .for_ticker(context, ticker.as_str())?;

    let prompt = prompts::peers_prompt(ticker.as_str(), &profile);
    let raw = state
        .llm
        .complete(model, &prompt, options.openai_token.as_deref())
        .await
        .for_ticker(context, ticker.as_str())?;

    let peers = parser::parse_peers_response(&raw).for_ticker(context, ticker.as_str())?;

    Ok(Json(PeersResponse { peers }))
}
