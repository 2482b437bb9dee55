//! Yahoo Finance chart API client (primary source, no API key)

use crate::health::HealthTracker;
use crate::types::{DailyClose, EquityDataSource, MarketDataError, PricePoint, Result, SourceHealth};
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::{Duration, Instant};
use tracing::debug;

const YAHOO_CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Minimum delay between consecutive requests (unauthenticated endpoint)
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Yahoo Finance client for daily close history and latest quotes
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    last_request: tokio::sync::Mutex<Instant>,
    /// Internal health tracking to avoid API calls in health()
    health_tracker: HealthTracker,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_BASE.to_string())
    }

    /// Create with a custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            last_request: tokio::sync::Mutex::new(Instant::now() - Duration::from_secs(10)),
            health_tracker: HealthTracker::new(),
        }
    }

    /// Rate-limited GET with per-request timeout
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        // Ensure minimum delay between requests
        {
            let mut last = self.last_request.lock().await;
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
            *last = Instant::now();
        }

        let started = Instant::now();
        let response = match tokio::time::timeout(REQUEST_TIMEOUT, self.client.get(url).send()).await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                self.health_tracker.record_failure();
                return Err(MarketDataError::ApiError(e.to_string()));
            }
            Err(_) => {
                self.health_tracker.record_failure();
                return Err(MarketDataError::ApiError(format!(
                    "Yahoo request to {} timed out after {}s",
                    url,
                    REQUEST_TIMEOUT.as_secs()
                )));
            }
        };

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.health_tracker.record_failure();
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(MarketDataError::RateLimit {
                provider: "yahoo".to_string(),
                retry_after,
            });
        }

        if !status.is_success() {
            self.health_tracker.record_failure();
            let text = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ApiError(format!(
                "Yahoo API error ({}): {}",
                status, text
            )));
        }

        self.health_tracker
            .record_success(started.elapsed().as_millis() as u64);

        response.json::<T>().await.map_err(|e| {
            self.health_tracker.record_failure();
            MarketDataError::InvalidResponse(e.to_string())
        })
    }

    /// Smallest chart range that covers `lookback` trading days
    fn range_for(lookback: usize) -> &'static str {
        match lookback {
            0..=5 => "5d",
            6..=21 => "1mo",
            22..=65 => "3mo",
            66..=250 => "1y",
            _ => "2y",
        }
    }

    pub async fn daily_history(&self, symbol: &str, lookback: usize) -> Result<Vec<DailyClose>> {
        let url = format!(
            "{}/{}?range={}&interval=1d",
            self.base_url,
            symbol,
            Self::range_for(lookback)
        );

        debug!("Fetching Yahoo history for {} from {}", symbol, url);

        let ChartResponse { chart } = self.get_json(&url).await?;

        if let Some(err) = chart.error {
            return Err(MarketDataError::SymbolNotFound(format!(
                "{}: {}",
                symbol, err.description
            )));
        }

        let mut results = chart.result.unwrap_or_default();
        if results.is_empty() {
            return Err(MarketDataError::InvalidResponse(format!(
                "empty chart result for {}",
                symbol
            )));
        }
        let data = results.remove(0);

        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::InvalidResponse("missing quote block".to_string()))?;

        // Nulls appear on partially-traded days; skip them rather than fabricate
        let mut series: Vec<DailyClose> = timestamps
            .iter()
            .zip(quote.close.iter())
            .filter_map(|(&ts, close)| {
                let close = (*close)?;
                let date = DateTime::from_timestamp(ts, 0)?.date_naive();
                let close = Decimal::try_from(close).ok()?;
                Some(DailyClose { date, close })
            })
            .collect();

        if series.len() > lookback {
            let excess = series.len() - lookback;
            series.drain(..excess);
        }

        Ok(series)
    }

    pub async fn latest_close(&self, symbol: &str) -> Result<PricePoint> {
        let series = self.daily_history(symbol, 5).await?;
        let last = series.last().ok_or_else(|| {
            MarketDataError::InvalidResponse(format!("no recent closes for {}", symbol))
        })?;

        Ok(PricePoint {
            symbol: symbol.to_uppercase(),
            price: last.close,
            source: "yahoo".to_string(),
            timestamp: Utc::now(),
        })
    }

    pub fn health(&self) -> SourceHealth {
        self.health_tracker.to_health("yahoo")
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

// Response types for the Yahoo chart API
#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartError {
    #[allow(dead_code)] // Deserialized from API but not used
    code: String,
    description: String,
}

#[derive(Debug, serde::Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, serde::Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, serde::Deserialize)]
struct QuoteBlock {
    close: Vec<Option<f64>>,
}

#[async_trait::async_trait]
impl EquityDataSource for YahooFinanceClient {
    async fn latest_close(&self, symbol: &str) -> Result<PricePoint> {
        YahooFinanceClient::latest_close(self, symbol).await
    }

    async fn daily_history(&self, symbol: &str, lookback: usize) -> Result<Vec<DailyClose>> {
        YahooFinanceClient::daily_history(self, symbol, lookback).await
    }

    async fn health(&self) -> SourceHealth {
        YahooFinanceClient::health(self)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
