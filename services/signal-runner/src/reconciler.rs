//! Price reconciliation across the primary and authoritative sources

use crate::types::{EngineError, Result};
use rust_decimal::Decimal;
use tracing::warn;

/// Single trusted price for one symbol, resolved from up to two observations
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledPrice {
    pub symbol: String,
    pub value: Decimal,
    /// Set when the two sources diverged beyond tolerance. Not an error:
    /// the tie-break below resolves it, this flag only surfaces it.
    pub disagreement: bool,
}

/// Resolve one trusted price from the primary and secondary observations.
///
/// When both sources answer and differ by more than 2% of the primary's
/// value, the secondary wins: it is the officially authoritative feed, and
/// divergence means the cheap primary is the one to distrust. With a single
/// observation there is nothing to cross-check, so it is used unflagged.
/// With none, the symbol has no price this run and the caller must skip it.
pub fn reconcile(
    symbol: &str,
    primary: Option<Decimal>,
    secondary: Option<Decimal>,
) -> Result<ReconciledPrice> {
    let tolerance = Decimal::new(2, 2); // 2%

    match (primary, secondary) {
        (Some(primary), Some(secondary)) => {
            let divergence = (secondary - primary).abs();
            if divergence > primary.abs() * tolerance {
                warn!(
                    %symbol,
                    %primary,
                    %secondary,
                    "price sources disagree, trusting authoritative source"
                );
                Ok(ReconciledPrice {
                    symbol: symbol.to_string(),
                    value: secondary,
                    disagreement: true,
                })
            } else {
                Ok(ReconciledPrice {
                    symbol: symbol.to_string(),
                    value: primary,
                    disagreement: false,
                })
            }
        }
        (Some(value), None) | (None, Some(value)) => Ok(ReconciledPrice {
            symbol: symbol.to_string(),
            value,
            disagreement: false,
        }),
        (None, None) => Err(EngineError::NoPriceAvailable {
            symbol: symbol.to_string(),
        }),
    }
}
