use serde::Deserialize;

const DEFAULT_WATCHLIST: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "BRK.B", "JPM", "V",
];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub finnhub_api_key: String,
    #[serde(default = "default_finnhub_base_url")]
    pub finnhub_base_url: String,

    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_app_server_port")]
    pub app_server_port: u16,

    /// Symbols kept warm by the price cache refresher.
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Applied to every outbound provider call.
    #[serde(default = "default_upstream_timeout_seconds")]
    pub upstream_timeout_seconds: u64,
    #[serde(default = "default_news_lookback_days")]
    pub news_lookback_days: i64,
}

fn default_finnhub_base_url() -> String {
    "https://finnhub.io/api/v1".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_app_server_port() -> u16 {
    8080
}

fn default_watchlist() -> Vec<String> {
    DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect()
}

fn default_refresh_interval_seconds() -> u64 {
    600
}

fn default_snapshot_path() -> String {
    "stock_prices.json".to_string()
}

fn default_upstream_timeout_seconds() -> u64 {
    30
}

fn default_news_lookback_days() -> i64 {
    7
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config = envy::from_env::<AppConfig>()?;
        config.validate()
    }

    /// Normalises and checks a deserialised config.
    pub fn validate(mut self) -> Result<Self, envy::Error> {
        if self.finnhub_api_key.trim().is_empty() {
            return Err(envy::Error::Custom(
                "FINNHUB_API_KEY cannot be empty.".to_string(),
            ));
        }

        if self.finnhub_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "FINNHUB_BASE_URL cannot be empty.".to_string(),
            ));
        }

        self.gemini_api_key = non_blank(self.gemini_api_key.take());
        self.openai_api_key = non_blank(self.openai_api_key.take());

        if self.gemini_api_key.is_none() && self.openai_api_key.is_none() {
            return Err(envy::Error::Custom(
                "At least one of GEMINI_API_KEY or OPENAI_API_KEY must be set.".to_string(),
            ));
        }

        self.watchlist = self
            .watchlist
            .iter()
            .map(|symbol| symbol.trim().to_uppercase())
            .filter(|symbol| !symbol.is_empty())
            .collect();

        if self.watchlist.is_empty() {
            return Err(envy::Error::Custom("WATCHLIST cannot be empty.".to_string()));
        }

        if self.refresh_interval_seconds == 0 {
            return Err(envy::Error::Custom(
                "REFRESH_INTERVAL_SECONDS must be greater than zero.".to_string(),
            ));
        }

        if self.upstream_timeout_seconds == 0 {
            return Err(envy::Error::Custom(
                "UPSTREAM_TIMEOUT_SECONDS must be greater than zero.".to_string(),
            ));
        }

        if self.news_lookback_days <= 0 {
            return Err(envy::Error::Custom(
                "NEWS_LOOKBACK_DAYS must be greater than zero.".to_string(),
            ));
        }

        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
