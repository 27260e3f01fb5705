use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::snapshot::{self, PriceMap};
use crate::clients::finnhub::FinnhubClient;
use crate::config::AppConfig;
use crate::errors::service_error::ServiceError;

/// Last known price for one watchlist symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCacheEntry {
    pub symbol: String,
    pub price: f64,
    pub percent_change: f64,
    pub last_updated: DateTime<Utc>,
}

/// Outcome of a single refresh cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RefreshSummary {
    pub updated: Vec<String>,
    pub failed: Vec<String>,
    pub persisted: bool,
}

/// `(current - previous_close) / previous_close * 100`, or 0 without a usable close.
///
/// The result is always finite; JSON has no encoding for infinities.
pub fn percent_change(current: f64, previous_close: Option<f64>) -> f64 {
    previous_close
        .filter(|close| *close != 0.0 && close.is_finite())
        .map(|close| (current - close) / close * 100.0)
        .filter(|change| change.is_finite())
        .unwrap_or(0.0)
}

/// Price cache for the configured watchlist, refreshed in the background
/// and mirrored to a snapshot file.
#[derive(Clone)]
pub struct PriceCache {
    /// Map of symbol to its latest entry
    entries: Arc<RwLock<PriceMap>>,
    client: FinnhubClient,
    watchlist: Arc<Vec<String>>,
    refresh_interval: Duration,
    snapshot_path: Arc<PathBuf>,
}

impl PriceCache {
    /// Create an empty cache
    pub fn new(config: &AppConfig, client: FinnhubClient) -> Self {
        Self {
            entries: Arc::new(RwLock::new(PriceMap::new())),
            client,
            watchlist: Arc::new(config.watchlist.clone()),
            refresh_interval: Duration::from_secs(config.refresh_interval_seconds),
            snapshot_path: Arc::new(PathBuf::from(&config.snapshot_path)),
        }
    }

    /// Create a cache seeded from the snapshot file, if one can be read.
    ///
    /// A missing or malformed snapshot is not fatal; the cache starts empty.
    pub async fn restore(config: &AppConfig, client: FinnhubClient) -> Self {
        let cache = Self::new(config, client);

        match snapshot::load(&cache.snapshot_path).await {
            Ok(entries) => {
                info!(
                    path = %cache.snapshot_path.display(),
                    symbols = entries.len(),
                    "Restored price cache from snapshot"
                );
                *cache.entries.write().await = entries;
            }
            Err(e) if e.is_missing() => {
                info!(path = %cache.snapshot_path.display(), "No price snapshot found, starting empty");
            }
            Err(e) => {
                warn!(
                    path = %cache.snapshot_path.display(),
                    error = %e,
                    "Ignoring unreadable price snapshot"
                );
            }
        }

        cache
    }

    /// Current contents as-is. May trail the market by up to one refresh interval.
    pub async fn snapshot(&self) -> PriceMap {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, symbol: &str) -> Option<PriceCacheEntry> {
        self.entries.read().await.get(symbol).cloned()
    }

    /// Start the background task: one refresh immediately, then one per interval.
    pub fn start_background_task(&self) -> JoinHandle<()> {
        let cache = self.clone();

        tokio::spawn(async move {
            loop {
                cache.refresh().await;
                tokio::time::sleep(cache.refresh_interval).await;
            }
        })
    }

    /// Run one refresh cycle over the whole watchlist and persist the result.
    ///
    /// Per-symbol failures are logged and skipped; they are retried on the
    /// next cycle only. A failed snapshot write leaves the in-memory cache as is.
    pub async fn refresh(&self) -> RefreshSummary {
        info!(symbols = self.watchlist.len(), "Starting price cache refresh");
        let mut summary = RefreshSummary::default();

        for symbol in self.watchlist.iter() {
            match self.fetch_entry(symbol).await {
                Ok(entry) => {
                    debug!(
                        symbol = %symbol,
                        price = entry.price,
                        percent_change = entry.percent_change,
                        "Updated cached price"
                    );
                    self.entries.write().await.insert(symbol.clone(), entry);
                    summary.updated.push(symbol.clone());
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Failed to refresh cached price");
                    summary.failed.push(symbol.clone());
                }
            }
        }

        let entries = self.snapshot().await;
        match snapshot::save(&self.snapshot_path, &entries).await {
            Ok(()) => summary.persisted = true,
            Err(e) => {
                error!(
                    path = %self.snapshot_path.display(),
                    error = %e,
                    "Failed to write price snapshot"
                );
            }
        }

        info!(
            updated = summary.updated.len(),
            failed = summary.failed.len(),
            persisted = summary.persisted,
            "Finished price cache refresh"
        );

        summary
    }

    async fn fetch_entry(&self, symbol: &str) -> Result<PriceCacheEntry, ServiceError> {
        let quote = self.client.quote(symbol).await?;
        let price = quote
            .usable_price()
            .ok_or_else(|| ServiceError::NotFound(format!("no current price for {symbol}")))?;

        Ok(PriceCacheEntry {
            symbol: symbol.to_string(),
            price,
            percent_change: percent_change(price, quote.previous_close),
            last_updated: Utc::now(),
        })
    }
}
