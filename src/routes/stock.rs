//! Provider routes for one ticker: profile, news, quote and P/E rating.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::analysis::rating::{rate_pe, Rating};
use crate::background::price_cache::percent_change;
use crate::clients::finnhub::{CompanyProfile, NewsArticle};
use crate::errors::api_error::{ApiError, WithTicker};
use crate::errors::service_error::ServiceError;
use crate::extractors::ticker::Ticker;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub symbol: String,
    pub current: f64,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub symbol: String,
    pub pe_ratio: Option<f64>,
    pub rating: Rating,
}

#[instrument(skip(state))]
pub async fn get_company_profile(
    State(state): State<AppState>,
    ticker: Ticker,
) -> Result<Json<CompanyProfile>, ApiError> {
    info!(ticker = %ticker.as_str(), "Received company profile request.");

    let profile = state
        .finnhub
        .company_profile(ticker.as_str())
        .await
        .for_ticker("Failed to fetch company profile", ticker.as_str())?;

    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn get_company_news(
    State(state): State<AppState>,
    ticker: Ticker,
) -> Result<Json<Vec<NewsArticle>>, ApiError> {
    let news = state
        .finnhub
        .company_news(ticker.as_str())
        .await
        .for_ticker("Failed to fetch company news", ticker.as_str())?;

    info!(ticker = %ticker.as_str(), articles = news.len(), "Fetched company news.");
    Ok(Json(news))
}

#[instrument(skip(state))]
pub async fn get_quote(
    State(state): State<AppState>,
    ticker: Ticker,
) -> Result<Json<QuoteResponse>, ApiError> {
    let context = "Failed to fetch stock quote";

    let quote = state
        .finnhub
        .quote(ticker.as_str())
        .await
        .for_ticker(context, ticker.as_str())?;

    let current = quote.usable_price().ok_or_else(|| {
        ApiError::new(
            ServiceError::NotFound(format!("no current price for {}", ticker.as_str())),
            context,
            ticker.as_str(),
        )
    })?;

    Ok(Json(QuoteResponse {
        symbol: ticker.0.clone(),
        current,
        previous_close: quote.previous_close,
        change: quote.change,
        percent_change: percent_change(current, quote.previous_close),
        high: quote.high,
        low: quote.low,
        open: quote.open,
    }))
}

/// Buy, Hold or Sell from the trailing P/E. A missing ratio is `No Rating`, not an error.
#[instrument(skip(state))]
pub async fn get_rating(
    State(state): State<AppState>,
    ticker: Ticker,
) -> Result<Json<RatingResponse>, ApiError> {
    let financials = state
        .finnhub
        .basic_financials(ticker.as_str())
        .await
        .for_ticker("Failed to fetch stock rating", ticker.as_str())?;

    let pe_ratio = financials.metric.pe_ttm.filter(|pe| pe.is_finite());
    let rating = rate_pe(pe_ratio);
    info!(ticker = %ticker.as_str(), ?pe_ratio, ?rating, "Rated stock.");

    Ok(Json(RatingResponse {
        symbol: ticker.0.clone(),
        pe_ratio,
        rating,
    }))
}
