//! # Finnhub Data Provider Client
//!
//! Thin wrapper over the Finnhub endpoints the service consumes: company
//! profile, company news, real-time quote and basic financials.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::service_error::ServiceError;
use crate::utils::market_date;

//
// ----------- Data Structures -----------
//

/// Company profile as returned by `/stock/profile2`, passed through to callers.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub finnhub_industry: Option<String>,
    #[serde(default)]
    pub market_capitalization: Option<f64>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub share_outstanding: Option<f64>,
    #[serde(default)]
    pub ipo: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub weburl: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl CompanyProfile {
    /// Finnhub answers unknown symbols with `{}` rather than an error status.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.ticker.is_none()
    }
}

/// Raw article shape from `/company-news`.
#[derive(Debug, Deserialize)]
struct FinnhubNewsItem {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    datetime: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub source: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
}

impl From<FinnhubNewsItem> for NewsArticle {
    fn from(raw: FinnhubNewsItem) -> Self {
        NewsArticle {
            headline: raw.headline,
            summary: raw.summary,
            url: raw.url,
            source: raw.source,
            published_date: (raw.datetime > 0)
                .then(|| DateTime::from_timestamp(raw.datetime, 0))
                .flatten(),
        }
    }
}

/// Raw `/quote` payload. Unknown symbols come back as all zeros.
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    #[serde(rename = "c")]
    pub current: Option<f64>,
    #[serde(rename = "pc")]
    pub previous_close: Option<f64>,
    #[serde(rename = "d")]
    pub change: Option<f64>,
    #[serde(rename = "h")]
    pub high: Option<f64>,
    #[serde(rename = "l")]
    pub low: Option<f64>,
    #[serde(rename = "o")]
    pub open: Option<f64>,
}

impl Quote {
    /// The current price, if the provider returned one that can be used.
    pub fn usable_price(&self) -> Option<f64> {
        self.current.filter(|price| price.is_finite() && *price > 0.0)
    }
}

/// `/stock/metric?metric=all`. Only the fields the service reads are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicFinancials {
    #[serde(default)]
    pub metric: Metrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metrics {
    /// Trailing twelve-month P/E; absent for loss-making or newly listed companies.
    #[serde(rename = "peTTM", default)]
    pub pe_ttm: Option<f64>,
}

#[derive(Serialize)]
struct NewsQuery<'a> {
    symbol: &'a str,
    #[serde(with = "market_date")]
    from: NaiveDate,
    #[serde(with = "market_date")]
    to: NaiveDate,
}

//
// ----------- Client -----------
//

#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    news_lookback_days: i64,
}

impl FinnhubClient {
    pub fn new(config: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: config.finnhub_base_url.trim_end_matches('/').to_string(),
            api_key: config.finnhub_api_key.clone(),
            news_lookback_days: config.news_lookback_days,
        }
    }

    fn headers(&self) -> Result<HeaderMap, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Finnhub-Token",
            HeaderValue::from_str(&self.api_key).map_err(|_| {
                ServiceError::UpstreamUnavailable("Finnhub API key is not a valid header".into())
            })?,
        );
        Ok(headers)
    }

    async fn get_json<Q, T>(&self, path: &str, query: &Q) -> Result<T, ServiceError>
    where
        Q: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Calling Finnhub");

        let response = self
            .http
            .get(url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;

        Ok(response)
    }

    pub async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile, ServiceError> {
        let profile: CompanyProfile = self
            .get_json("/stock/profile2", &[("symbol", ticker)])
            .await?;

        if profile.is_empty() {
            return Err(ServiceError::NotFound(format!("no company profile for {ticker}")));
        }

        Ok(profile)
    }

    /// Articles from the configured lookback window, most recent first.
    pub async fn company_news(&self, ticker: &str) -> Result<Vec<NewsArticle>, ServiceError> {
        let (from, to) = market_date::lookback_window(Utc::now(), self.news_lookback_days);
        let query = NewsQuery {
            symbol: ticker,
            from,
            to,
        };

        let raw: Vec<FinnhubNewsItem> = self.get_json("/company-news", &query).await?;

        let mut articles: Vec<NewsArticle> = raw.into_iter().map(NewsArticle::from).collect();
        articles.sort_by(|a, b| b.published_date.cmp(&a.published_date));
        Ok(articles)
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote, ServiceError> {
        self.get_json("/quote", &[("symbol", symbol)]).await
    }

    pub async fn basic_financials(&self, ticker: &str) -> Result<BasicFinancials, ServiceError> {
        self.get_json("/stock/metric", &[("symbol", ticker), ("metric", "all")])
            .await
    }
}
