use std::sync::Arc;

use crate::background::price_cache::PriceCache;
use crate::clients::{finnhub::FinnhubClient, llm::LlmClient};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub finnhub: FinnhubClient,
    pub llm: LlmClient,
    pub price_cache: PriceCache,
}

impl AppState {
    pub fn new(config: AppConfig, price_cache: PriceCache) -> Self {
        Self {
            finnhub: FinnhubClient::new(&config),
            llm: LlmClient::new(&config),
            config: Arc::new(config),
            price_cache,
        }
    }

    /// Builds the clients and restores the price cache from its snapshot.
    pub async fn bootstrap(config: AppConfig) -> Self {
        let price_cache = PriceCache::restore(&config, FinnhubClient::new(&config)).await;
        Self::new(config, price_cache)
    }
}
