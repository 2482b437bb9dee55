//! Action classification from reconciled price, indicators and thresholds

use crate::indicators::IndicatorSnapshot;
use crate::policy::ThresholdSet;
use crate::reconciler::ReconciledPrice;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-symbol classification for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Uptrend plus oversold pullback
    #[serde(rename = "BUY")]
    Buy,
    /// Overbought
    #[serde(rename = "SELL")]
    Sell,
    /// Bear regime
    #[serde(rename = "AVOID")]
    Avoid,
    /// No rule matched
    #[serde(rename = "WAIT")]
    Wait,
    /// Abrupt drop, likely a corporate action rather than a crash
    #[serde(rename = "SUSPICIOUS")]
    Suspicious,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Avoid => "AVOID",
            Action::Wait => "WAIT",
            Action::Suspicious => "SUSPICIOUS",
        }
    }

    /// Classifications worth an alert
    pub fn is_actionable(&self) -> bool {
        matches!(self, Action::Buy | Action::Sell | Action::Suspicious)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one symbol. Rule order is the tie-break: the split guard runs
/// before everything else so a post-split price can never read as a dip buy,
/// and the buy rule outranks the sell/avoid rules.
pub fn classify(
    snapshot: &IndicatorSnapshot,
    current: &ReconciledPrice,
    thresholds: &ThresholdSet,
) -> Action {
    // 1. Split guard: day-over-day drop above 20% bypasses momentum/trend
    let split_tolerance = Decimal::new(20, 2);
    let drop = snapshot.previous_close - current.value;
    if drop > snapshot.previous_close * split_tolerance {
        return Action::Suspicious;
    }

    // 2. Uptrend + oversold pullback
    if current.value > snapshot.trend_average && snapshot.momentum < thresholds.buy_ceiling {
        return Action::Buy;
    }

    // 3. Overbought
    if snapshot.momentum > thresholds.sell_floor {
        return Action::Sell;
    }

    // 4. Bear regime
    if current.value < snapshot.trend_average {
        return Action::Avoid;
    }

    Action::Wait
}
