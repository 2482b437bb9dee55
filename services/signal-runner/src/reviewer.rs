//! Grading of past predictions against realized prices

use crate::classifier::Action;
use crate::journal::{Journal, Outcome};
use crate::ledger::ConfidenceLedger;
use crate::notifier::AlertNotifier;
use crate::reconciler::ReconciledPrice;
use crate::types::Result;
use market_data::symbols::company_name;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Reward for a buy call that moved at least 2% up
pub const WIN_DELTA: i64 = 10;

/// Penalty for a buy call that moved at least 2% down. Twice the reward:
/// the confidence signal tightens faster than it loosens.
pub const LOSS_DELTA: i64 = -20;

/// Tally of one review pass
#[derive(Debug, Default, Clone, Copy)]
pub struct ReviewSummary {
    pub graded_wins: u32,
    pub graded_losses: u32,
    pub still_pending: u32,
}

/// Grade every pending BUY prediction for which a reconciled price is
/// available this run.
///
/// Only BUY calls are graded. The other actions state what not to do, so
/// they carry no measurable win condition; their rows are excluded from
/// grading scope and simply stay Pending. A BUY whose price has moved less
/// than 2% either way is deferred, not abandoned: it stays Pending and is
/// re-examined on the next run.
///
/// Commit order per transition: journal first, ledger second. A grade whose
/// journal write fails rolls back in memory and is retried on a later run; a
/// grade whose ledger write fails after the journal committed is logged and
/// dropped, because the terminal row must never be scored twice.
pub async fn review_pending(
    journal: &mut Journal,
    prices: &HashMap<String, ReconciledPrice>,
    ledger: &mut ConfidenceLedger,
    notifier: &AlertNotifier,
) -> Result<ReviewSummary> {
    let mut summary = ReviewSummary::default();
    let win_line = Decimal::new(102, 2); // +2%
    let loss_line = Decimal::new(98, 2); // -2%

    for index in journal.pending_indices() {
        let row = journal.rows()[index].clone();
        if row.action != Action::Buy {
            continue;
        }

        let Some(current) = prices.get(&row.symbol) else {
            debug!(symbol = %row.symbol, "No reconciled price, grade deferred");
            summary.still_pending += 1;
            continue;
        };

        let (outcome, delta) = if current.value >= row.price * win_line {
            (Outcome::Win, WIN_DELTA)
        } else if current.value <= row.price * loss_line {
            (Outcome::Loss, LOSS_DELTA)
        } else {
            summary.still_pending += 1;
            continue;
        };

        journal.set_outcome(index, outcome)?;
        match outcome {
            Outcome::Win => summary.graded_wins += 1,
            Outcome::Loss => summary.graded_losses += 1,
            Outcome::Pending => {}
        }

        match ledger.apply(delta, outcome) {
            Ok(state) => {
                info!(
                    symbol = %row.symbol,
                    %outcome,
                    delta,
                    score = state.score,
                    "Prediction graded"
                );
                notifier
                    .send(&format!(
                        "{} call on {} ({}) resolved {}: {:+} karma, score now {}",
                        row.action,
                        company_name(&row.symbol),
                        row.symbol,
                        outcome,
                        delta,
                        state.score
                    ))
                    .await;
            }
            Err(e) => {
                error!(
                    symbol = %row.symbol,
                    error = %e,
                    "Ledger update failed after journal commit; delta dropped"
                );
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::Prediction;
    use crate::ledger::LedgerState;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn d(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn buy_row(symbol: &str, price_cents: i64) -> Prediction {
        Prediction {
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            symbol: symbol.to_string(),
            price: d(price_cents),
            action: Action::Buy,
            momentum: 22.0,
            outcome: Outcome::Pending,
        }
    }

    fn price_map(entries: &[(&str, i64)]) -> HashMap<String, ReconciledPrice> {
        entries
            .iter()
            .map(|&(symbol, cents)| {
                (
                    symbol.to_string(),
                    ReconciledPrice {
                        symbol: symbol.to_string(),
                        value: d(cents),
                        disagreement: false,
                    },
                )
            })
            .collect()
    }

    struct Fixture {
        _dir: TempDir,
        journal: Journal,
        ledger: ConfidenceLedger,
        notifier: AlertNotifier,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let journal = Journal::load(dir.path().join("journal.csv")).unwrap();
        let ledger = ConfidenceLedger::load(dir.path().join("brain.json")).unwrap();
        Fixture {
            _dir: dir,
            journal,
            ledger,
            notifier: AlertNotifier::new(None).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_two_percent_gain_is_a_win() {
        let mut fx = fixture();
        fx.journal.append(buy_row("AAPL", 10_000)).unwrap();

        let summary = review_pending(
            &mut fx.journal,
            &price_map(&[("AAPL", 10_300)]),
            &mut fx.ledger,
            &fx.notifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.graded_wins, 1);
        assert_eq!(fx.journal.rows()[0].outcome, Outcome::Win);
        assert_eq!(fx.ledger.read(), LedgerState { score: 10, wins: 1, losses: 0 });
    }

    #[tokio::test]
    async fn test_two_percent_drop_is_a_loss() {
        let mut fx = fixture();
        fx.journal.append(buy_row("AAPL", 10_000)).unwrap();

        let summary = review_pending(
            &mut fx.journal,
            &price_map(&[("AAPL", 9_700)]),
            &mut fx.ledger,
            &fx.notifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.graded_losses, 1);
        assert_eq!(fx.journal.rows()[0].outcome, Outcome::Loss);
        assert_eq!(fx.ledger.read(), LedgerState { score: -20, wins: 0, losses: 1 });
    }

    #[tokio::test]
    async fn test_small_move_stays_pending() {
        let mut fx = fixture();
        fx.journal.append(buy_row("AAPL", 10_000)).unwrap();

        let summary = review_pending(
            &mut fx.journal,
            &price_map(&[("AAPL", 10_100)]),
            &mut fx.ledger,
            &fx.notifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.still_pending, 1);
        assert_eq!(fx.journal.rows()[0].outcome, Outcome::Pending);
        assert_eq!(fx.ledger.read(), LedgerState::default());
    }

    #[tokio::test]
    async fn test_exact_boundaries_grade() {
        let mut fx = fixture();
        fx.journal.append(buy_row("UP", 10_000)).unwrap();
        fx.journal.append(buy_row("DOWN", 10_000)).unwrap();

        review_pending(
            &mut fx.journal,
            &price_map(&[("UP", 10_200), ("DOWN", 9_800)]),
            &mut fx.ledger,
            &fx.notifier,
        )
        .await
        .unwrap();

        assert_eq!(fx.journal.rows()[0].outcome, Outcome::Win);
        assert_eq!(fx.journal.rows()[1].outcome, Outcome::Loss);
        assert_eq!(fx.ledger.read(), LedgerState { score: -10, wins: 1, losses: 1 });
    }

    #[tokio::test]
    async fn test_graded_rows_are_terminal() {
        let mut fx = fixture();
        fx.journal.append(buy_row("AAPL", 10_000)).unwrap();

        let prices = price_map(&[("AAPL", 10_300)]);
        review_pending(&mut fx.journal, &prices, &mut fx.ledger, &fx.notifier)
            .await
            .unwrap();
        assert_eq!(fx.ledger.read().score, 10);

        // A second review over the same journal must not re-apply the delta
        let summary = review_pending(&mut fx.journal, &prices, &mut fx.ledger, &fx.notifier)
            .await
            .unwrap();
        assert_eq!(summary.graded_wins, 0);
        assert_eq!(fx.ledger.read().score, 10);
        assert_eq!(fx.ledger.read().wins, 1);
    }

    #[tokio::test]
    async fn test_non_buy_rows_are_never_graded() {
        let mut fx = fixture();
        let mut sell = buy_row("AAPL", 10_000);
        sell.action = Action::Sell;
        fx.journal.append(sell).unwrap();
        let mut avoid = buy_row("MSFT", 10_000);
        avoid.action = Action::Avoid;
        fx.journal.append(avoid).unwrap();

        let summary = review_pending(
            &mut fx.journal,
            &price_map(&[("AAPL", 12_000), ("MSFT", 8_000)]),
            &mut fx.ledger,
            &fx.notifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.graded_wins + summary.graded_losses, 0);
        assert_eq!(fx.journal.rows()[0].outcome, Outcome::Pending);
        assert_eq!(fx.journal.rows()[1].outcome, Outcome::Pending);
        assert_eq!(fx.ledger.read(), LedgerState::default());
    }

    #[tokio::test]
    async fn test_missing_price_defers_grade() {
        let mut fx = fixture();
        fx.journal.append(buy_row("AAPL", 10_000)).unwrap();

        let summary = review_pending(
            &mut fx.journal,
            &HashMap::new(),
            &mut fx.ledger,
            &fx.notifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.still_pending, 1);
        assert_eq!(fx.journal.rows()[0].outcome, Outcome::Pending);
    }
}
