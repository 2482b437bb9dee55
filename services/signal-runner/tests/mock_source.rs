//! In-memory data source shared by the harness tests

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use market_data::{
    DailyClose, EquityDataSource, MarketDataError, PricePoint, SourceHealth,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Scripted price source: each symbol maps to a close series (in cents) the
/// test can extend between runs to simulate the market moving.
pub struct MockEquitySource {
    name: &'static str,
    series: Mutex<HashMap<String, Vec<Decimal>>>,
}

impl MockEquitySource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            series: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_series(&self, symbol: &str, closes_in_cents: Vec<i64>) {
        let closes = closes_in_cents
            .into_iter()
            .map(|cents| Decimal::new(cents, 2))
            .collect();
        self.series.lock().unwrap().insert(symbol.to_string(), closes);
    }

    pub fn push_close(&self, symbol: &str, cents: i64) {
        self.series
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default()
            .push(Decimal::new(cents, 2));
    }

    pub fn clear(&self, symbol: &str) {
        self.series.lock().unwrap().remove(symbol);
    }
}

#[async_trait]
impl EquityDataSource for MockEquitySource {
    async fn latest_close(&self, symbol: &str) -> market_data::Result<PricePoint> {
        let series = self.series.lock().unwrap();
        let closes = series
            .get(symbol)
            .filter(|closes| !closes.is_empty())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        Ok(PricePoint {
            symbol: symbol.to_string(),
            price: *closes.last().unwrap(),
            source: self.name.to_string(),
            timestamp: Utc::now(),
        })
    }

    async fn daily_history(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> market_data::Result<Vec<DailyClose>> {
        let series = self.series.lock().unwrap();
        let closes = series
            .get(symbol)
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut history: Vec<DailyClose> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyClose {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect();

        if history.len() > lookback {
            let excess = history.len() - lookback;
            history.drain(..excess);
        }
        Ok(history)
    }

    async fn health(&self) -> SourceHealth {
        SourceHealth {
            source: self.name.to_string(),
            is_healthy: true,
            last_success: Some(Utc::now()),
            last_error: None,
            success_rate: 1.0,
            avg_latency_ms: 0,
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}
