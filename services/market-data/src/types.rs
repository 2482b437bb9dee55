use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One quote observation from one source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,          // "AAPL", "MSFT", etc.
    pub price: Decimal,
    pub source: String,          // "yahoo", "alphavantage"
    pub timestamp: DateTime<Utc>,
}

/// One element of a daily close series, chronological
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Data source health/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source: String,
    pub is_healthy: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub success_rate: f64,
    pub avg_latency_ms: u64,
}

/// Error types for market data retrieval
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("rate limit exceeded for {provider}")]
    RateLimit { provider: String, retry_after: Option<u64> },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
}

/// Result type for market data operations
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// Trait for equity data sources
#[async_trait::async_trait]
pub trait EquityDataSource: Send + Sync {
    /// Get the most recent daily close for a symbol
    async fn latest_close(&self, symbol: &str) -> Result<PricePoint>;

    /// Get up to `lookback` daily closes, oldest first
    async fn daily_history(&self, symbol: &str, lookback: usize) -> Result<Vec<DailyClose>>;

    /// Get source health status
    async fn health(&self) -> SourceHealth;

    /// Source name
    fn name(&self) -> &str;
}
