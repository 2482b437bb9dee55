//! Trend and momentum indicators over a daily close series

use crate::types::{EngineError, Result};
use market_data::DailyClose;
use rust_decimal::Decimal;

/// Trading days in the trend average window
pub const TREND_PERIOD: usize = 200;

/// Day-over-day changes in the momentum oscillator window
pub const MOMENTUM_PERIOD: usize = 14;

/// Indicator values derived from one series, for one run
#[derive(Debug, Clone)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub latest_close: Decimal,
    /// Prior session close, kept for the day-over-day split guard
    pub previous_close: Decimal,
    /// Mean close over the last [`TREND_PERIOD`] sessions
    pub trend_average: Decimal,
    /// Bounded oscillator in [0, 100]; low = oversold, high = overbought
    pub momentum: f64,
}

/// Compute the indicator snapshot for the latest observation.
///
/// Fails with `InsufficientData` below [`TREND_PERIOD`] points; the trend
/// average is undefined on a shorter series and the caller must skip the
/// symbol rather than classify on a partial window.
pub fn compute(symbol: &str, closes: &[DailyClose]) -> Result<IndicatorSnapshot> {
    if closes.len() < TREND_PERIOD {
        return Err(EngineError::InsufficientData {
            symbol: symbol.to_string(),
            points: closes.len(),
            required: TREND_PERIOD,
        });
    }

    let latest_close = closes[closes.len() - 1].close;
    let previous_close = closes[closes.len() - 2].close;

    let sum: Decimal = closes.iter().rev().take(TREND_PERIOD).map(|c| c.close).sum();
    let trend_average = sum / Decimal::from(TREND_PERIOD as i64);

    Ok(IndicatorSnapshot {
        symbol: symbol.to_string(),
        latest_close,
        previous_close,
        trend_average,
        momentum: momentum_oscillator(closes),
    })
}

/// RSI-style oscillator: average gain over average loss across the last
/// [`MOMENTUM_PERIOD`] changes, scaled to 0-100. Saturates at 100 when the
/// window holds no losses.
fn momentum_oscillator(closes: &[DailyClose]) -> f64 {
    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in (closes.len() - MOMENTUM_PERIOD)..closes.len() {
        let change = closes[i].close - closes[i - 1].close;
        let change_f64 = change.to_string().parse::<f64>().unwrap_or(0.0);
        if change_f64 > 0.0 {
            gains += change_f64;
        } else {
            losses += change_f64.abs();
        }
    }

    let avg_loss = losses / MOMENTUM_PERIOD as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    let avg_gain = gains / MOMENTUM_PERIOD as f64;

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(closes_in_cents: impl IntoIterator<Item = i64>) -> Vec<DailyClose> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        closes_in_cents
            .into_iter()
            .enumerate()
            .map(|(i, cents)| DailyClose {
                date: start + Duration::days(i as i64),
                close: Decimal::new(cents, 2),
            })
            .collect()
    }

    #[test]
    fn test_199_points_is_insufficient() {
        let closes = series((0..199).map(|i| 10_000 + i));
        let err = compute("TEST", &closes).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { points: 199, required: 200, .. }
        ));
    }

    #[test]
    fn test_200_points_defines_trend_average() {
        // 200 closes of exactly 100.00 -> trend average 100.00
        let closes = series(std::iter::repeat(10_000).take(200));
        let snapshot = compute("TEST", &closes).unwrap();
        assert_eq!(snapshot.trend_average, Decimal::new(10_000, 2));
        assert_eq!(snapshot.latest_close, Decimal::new(10_000, 2));
        assert_eq!(snapshot.previous_close, Decimal::new(10_000, 2));
    }

    #[test]
    fn test_momentum_saturates_at_100_without_losses() {
        let closes = series((0..200).map(|i| 10_000 + i * 10));
        let snapshot = compute("TEST", &closes).unwrap();
        assert_eq!(snapshot.momentum, 100.0);
    }

    #[test]
    fn test_momentum_zero_on_steady_decline() {
        let closes = series((0..200).map(|i| 20_000 - i * 10));
        let snapshot = compute("TEST", &closes).unwrap();
        assert_eq!(snapshot.momentum, 0.0);
    }

    #[test]
    fn test_momentum_balanced_window_is_50() {
        // Flat run-in, then 14 alternating +1.00/-1.00 moves: equal average
        // gain and loss gives RS=1 and momentum 50.
        let mut cents: Vec<i64> = std::iter::repeat(10_000).take(186).collect();
        let mut level = 10_000;
        for i in 0..14 {
            level += if i % 2 == 0 { 100 } else { -100 };
            cents.push(level);
        }
        let snapshot = compute("TEST", &series(cents)).unwrap();
        assert!((snapshot.momentum - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_for_same_series() {
        let closes = series((0..220).map(|i| 10_000 + (i * 37) % 500));
        let a = compute("TEST", &closes).unwrap();
        let b = compute("TEST", &closes).unwrap();
        assert_eq!(a.trend_average, b.trend_average);
        assert_eq!(a.momentum, b.momentum);
        assert!(a.momentum >= 0.0 && a.momentum <= 100.0);
    }
}
