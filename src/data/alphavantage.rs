//! Alpha Vantage daily time-series client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::Market;
use crate::error::PipelineError;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Source of raw daily quote payloads.
///
/// Implementations return the provider's JSON verbatim. Error bodies (rate
/// limits, unknown symbols) are returned as payloads too; classifying them is
/// the normalizer's job.
pub trait QuoteProvider {
    fn fetch_daily(&self, ticker: &str, market: Market) -> Result<Value, PipelineError>;
}

pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        Self::new(config.alpha_vantage_key.clone(), config.http_timeout)
    }

    /// Point the client at a different endpoint (proxies, local mocks).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl QuoteProvider for AlphaVantageClient {
    fn fetch_daily(&self, ticker: &str, market: Market) -> Result<Value, PipelineError> {
        let symbol = symbol_for(ticker, market);
        info!(%symbol, "requesting daily series");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.as_str()),
                ("outputsize", "compact"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| PipelineError::Fetch(format!("request for {symbol} failed: {}", e.without_url())))?;

        if !resp.status().is_success() {
            return Err(PipelineError::Fetch(format!(
                "request for {symbol} failed with status {}.",
                resp.status()
            )));
        }

        resp.json::<Value>()
            .map_err(|e| PipelineError::Fetch(format!("failed to parse response for {symbol}: {}", e.without_url())))
    }
}

/// Provider symbol for a ticker: bare for NASDAQ, `TICKER.SUFFIX` elsewhere.
pub fn symbol_for(ticker: &str, market: Market) -> String {
    let ticker = ticker.trim().to_ascii_uppercase();
    match market.symbol_suffix() {
        Some(suffix) => format!("{ticker}.{suffix}"),
        None => ticker,
    }
}
