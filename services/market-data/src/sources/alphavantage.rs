//! Alpha Vantage client (authoritative secondary source, API key required)

use crate::health::HealthTracker;
use crate::types::{DailyClose, EquityDataSource, MarketDataError, PricePoint, Result, SourceHealth};
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::{Duration, Instant};
use tracing::debug;

const ALPHA_VANTAGE_BASE: &str = "https://www.alphavantage.co/query";

/// Free tier allows ~5 requests/minute; keep a polite floor between calls
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(800);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Alpha Vantage client for official end-of-day quotes
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
    last_request: tokio::sync::Mutex<Instant>,
    /// Internal health tracking to avoid API calls in health()
    health_tracker: HealthTracker,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ALPHA_VANTAGE_BASE.to_string())
    }

    /// Create with a custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            last_request: tokio::sync::Mutex::new(Instant::now() - Duration::from_secs(10)),
            health_tracker: HealthTracker::new(),
        }
    }

    /// Rate-limited GET returning the raw JSON document.
    ///
    /// Alpha Vantage reports quota exhaustion inside a 200 response body
    /// ("Note"/"Information" keys), so the payload is inspected before use.
    async fn get_json(&self, params: &str) -> Result<serde_json::Value> {
        {
            let mut last = self.last_request.lock().await;
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
            *last = Instant::now();
        }

        let url = format!("{}?{}&apikey={}", self.base_url, params, self.api_key);
        let started = Instant::now();

        let response = match tokio::time::timeout(REQUEST_TIMEOUT, self.client.get(&url).send()).await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                self.health_tracker.record_failure();
                return Err(MarketDataError::ApiError(e.to_string()));
            }
            Err(_) => {
                self.health_tracker.record_failure();
                return Err(MarketDataError::ApiError(format!(
                    "Alpha Vantage request timed out after {}s",
                    REQUEST_TIMEOUT.as_secs()
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.health_tracker.record_failure();
            let text = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ApiError(format!(
                "Alpha Vantage API error ({}): {}",
                status, text
            )));
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            self.health_tracker.record_failure();
            MarketDataError::InvalidResponse(e.to_string())
        })?;

        if value.get("Note").is_some() || value.get("Information").is_some() {
            self.health_tracker.record_failure();
            return Err(MarketDataError::RateLimit {
                provider: "alphavantage".to_string(),
                retry_after: None,
            });
        }
        if let Some(msg) = value.get("Error Message").and_then(|v| v.as_str()) {
            self.health_tracker.record_failure();
            return Err(MarketDataError::ApiError(msg.to_string()));
        }

        self.health_tracker
            .record_success(started.elapsed().as_millis() as u64);

        Ok(value)
    }

    pub async fn latest_close(&self, symbol: &str) -> Result<PricePoint> {
        debug!("Fetching Alpha Vantage quote for {}", symbol);

        let value = self
            .get_json(&format!("function=GLOBAL_QUOTE&symbol={}", symbol))
            .await?;

        let quote = value
            .get("Global Quote")
            .and_then(|v| v.as_object())
            .ok_or_else(|| {
                MarketDataError::InvalidResponse("missing Global Quote object".to_string())
            })?;

        // An empty quote object is how the API answers for unknown tickers
        if quote.is_empty() {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        let price = quote
            .get("05. price")
            .and_then(|v| v.as_str())
            .ok_or_else(|| MarketDataError::InvalidResponse("missing price field".to_string()))?
            .parse::<Decimal>()
            .map_err(|e| MarketDataError::InvalidResponse(e.to_string()))?;

        Ok(PricePoint {
            symbol: symbol.to_uppercase(),
            price,
            source: "alphavantage".to_string(),
            timestamp: Utc::now(),
        })
    }

    pub async fn daily_history(&self, symbol: &str, lookback: usize) -> Result<Vec<DailyClose>> {
        let outputsize = if lookback > 100 { "full" } else { "compact" };
        let value = self
            .get_json(&format!(
                "function=TIME_SERIES_DAILY&symbol={}&outputsize={}",
                symbol, outputsize
            ))
            .await?;

        let days = value
            .get("Time Series (Daily)")
            .and_then(|v| v.as_object())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let mut series: Vec<DailyClose> = days
            .iter()
            .filter_map(|(date, fields)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                let close = fields.get("4. close")?.as_str()?.parse::<Decimal>().ok()?;
                Some(DailyClose { date, close })
            })
            .collect();

        series.sort_by_key(|c| c.date);
        if series.len() > lookback {
            let excess = series.len() - lookback;
            series.drain(..excess);
        }

        Ok(series)
    }

    pub fn health(&self) -> SourceHealth {
        self.health_tracker.to_health("alphavantage")
    }
}

#[async_trait::async_trait]
impl EquityDataSource for AlphaVantageClient {
    async fn latest_close(&self, symbol: &str) -> Result<PricePoint> {
        AlphaVantageClient::latest_close(self, symbol).await
    }

    async fn daily_history(&self, symbol: &str, lookback: usize) -> Result<Vec<DailyClose>> {
        AlphaVantageClient::daily_history(self, symbol, lookback).await
    }

    async fn health(&self) -> SourceHealth {
        AlphaVantageClient::health(self)
    }

    fn name(&self) -> &str {
        "alphavantage"
    }
}
