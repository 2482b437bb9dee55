//! Confidence-adaptive classification thresholds

/// Score above which the buy side loosens (proven track record)
pub const HOT_SCORE: i64 = 50;

/// Score below which the buy side tightens (recent calls going wrong)
pub const COLD_SCORE: i64 = -20;

const SELL_FLOOR: f64 = 75.0;

/// Momentum thresholds for one run, derived from the persisted score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    /// Momentum must be below this for a buy
    pub buy_ceiling: f64,
    /// Momentum above this is overbought
    pub sell_floor: f64,
}

/// Map the current confidence score to this run's thresholds.
///
/// Only the buy side adapts: a hot streak takes earlier entries (ceiling 40),
/// a cold streak waits for deeper dips (ceiling 25), everything in between
/// uses the baseline 35. The sell floor stays at 75 in all bands.
pub fn derive(score: i64) -> ThresholdSet {
    let buy_ceiling = if score > HOT_SCORE {
        40.0
    } else if score < COLD_SCORE {
        25.0
    } else {
        35.0
    };

    ThresholdSet {
        buy_ceiling,
        sell_floor: SELL_FLOOR,
    }
}
