//! Signal Runner - per-run orchestration
//!
//! One run grades the pending backlog first, then classifies the watchlist
//! with thresholds that already reflect this run's grades. Symbols are
//! processed sequentially with a politeness delay between source calls.

use crate::classifier::{self, Action};
use crate::config::Settings;
use crate::indicators;
use crate::journal::{Journal, Outcome, Prediction};
use crate::ledger::ConfidenceLedger;
use crate::notifier::AlertNotifier;
use crate::policy::{self, ThresholdSet};
use crate::reconciler::{self, ReconciledPrice};
use crate::reviewer::{self, ReviewSummary};
use crate::types::EngineError;
use chrono::Utc;
use market_data::symbols::company_name;
use market_data::{EquityDataSource, HeadlineClient};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrates one run over the journal and the watchlist
pub struct SignalRunner {
    settings: Settings,
    primary: Arc<dyn EquityDataSource>,
    secondary: Option<Arc<dyn EquityDataSource>>,
    headlines: Option<HeadlineClient>,
    notifier: AlertNotifier,
}

/// What one run did, for logging and scheduler integration
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub reviewed: ReviewSummary,
    pub signals: Vec<(String, Action)>,
    pub skipped: Vec<String>,
}

impl SignalRunner {
    pub fn new(
        settings: Settings,
        primary: Arc<dyn EquityDataSource>,
        secondary: Option<Arc<dyn EquityDataSource>>,
        headlines: Option<HeadlineClient>,
        notifier: AlertNotifier,
    ) -> Self {
        Self {
            settings,
            primary,
            secondary,
            headlines,
            notifier,
        }
    }

    pub fn notifier(&self) -> &AlertNotifier {
        &self.notifier
    }

    /// Execute one full run: review, then classify, then report.
    ///
    /// Per-symbol failures are logged and skipped; only environmental
    /// failures (unreadable journal/ledger, failed persists) abort the run.
    pub async fn run_once(&self) -> anyhow::Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!(%run_id, watchlist = ?self.settings.watchlist, "Starting signal run");

        let mut journal = Journal::load(self.settings.journal_path())?;
        let mut ledger = ConfidenceLedger::load(self.settings.ledger_path())?;
        let mut price_cache: HashMap<String, ReconciledPrice> = HashMap::new();

        // Phase 1: grade the pending backlog against fresh reconciled prices
        let backlog = self.backlog_symbols(&journal);
        for symbol in &backlog {
            match self.fetch_reconciled(symbol, None).await {
                Ok(price) => {
                    price_cache.insert(symbol.clone(), price);
                }
                Err(e) => warn!(%symbol, error = %e, "No reconciled price, grade deferred"),
            }
            tokio::time::sleep(self.settings.fetch_delay()).await;
        }
        let reviewed =
            reviewer::review_pending(&mut journal, &price_cache, &mut ledger, &self.notifier)
                .await?;

        // Phase 2: classify the watchlist. The ledger now carries this run's
        // grades, so the thresholds are derived only after the review.
        let thresholds = policy::derive(ledger.read().score);
        info!(
            score = ledger.read().score,
            buy_ceiling = thresholds.buy_ceiling,
            "Thresholds derived"
        );

        let mut signals = Vec::new();
        let mut skipped = Vec::new();
        let today = Utc::now().date_naive();

        for symbol in &self.settings.watchlist {
            match self
                .classify_symbol(symbol, &thresholds, &mut price_cache)
                .await
            {
                Ok((action, price, momentum)) => {
                    journal.append(Prediction {
                        date: today,
                        symbol: symbol.clone(),
                        price,
                        action,
                        momentum,
                        outcome: Outcome::Pending,
                    })?;
                    info!(%symbol, %action, %price, momentum, "Symbol classified");
                    if action.is_actionable() {
                        self.announce(symbol, action, price, momentum).await;
                    }
                    signals.push((symbol.clone(), action));
                }
                Err(e) => {
                    warn!(%symbol, error = %e, "Symbol skipped this run");
                    skipped.push(symbol.clone());
                }
            }
            tokio::time::sleep(self.settings.fetch_delay()).await;
        }

        self.log_source_health().await;

        let report = RunReport {
            run_id,
            reviewed,
            signals,
            skipped,
        };
        info!(
            %run_id,
            wins = report.reviewed.graded_wins,
            losses = report.reviewed.graded_losses,
            deferred = report.reviewed.still_pending,
            signals = report.signals.len(),
            skipped = report.skipped.len(),
            "Run complete"
        );
        Ok(report)
    }

    /// Symbols with an ungraded BUY row, deduplicated
    fn backlog_symbols(&self, journal: &Journal) -> Vec<String> {
        let mut symbols: Vec<String> = journal
            .pending_indices()
            .into_iter()
            .map(|i| &journal.rows()[i])
            .filter(|row| row.action == Action::Buy)
            .map(|row| row.symbol.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    /// Reconcile the current price from both sources. When the caller
    /// already holds the primary observation (the tail of a history fetch),
    /// it is passed in instead of spending another request.
    async fn fetch_reconciled(
        &self,
        symbol: &str,
        primary_close: Option<Decimal>,
    ) -> Result<ReconciledPrice, EngineError> {
        let primary = match primary_close {
            Some(close) => Some(close),
            None => match self.primary.latest_close(symbol).await {
                Ok(point) => Some(point.price),
                Err(e) => {
                    warn!(%symbol, source = self.primary.name(), error = %e, "Primary quote unavailable");
                    None
                }
            },
        };

        let secondary = match &self.secondary {
            Some(source) => match source.latest_close(symbol).await {
                Ok(point) => Some(point.price),
                Err(e) => {
                    warn!(%symbol, source = source.name(), error = %e, "Secondary quote unavailable");
                    None
                }
            },
            None => None,
        };

        reconciler::reconcile(symbol, primary, secondary)
    }

    /// Fetch, reconcile and classify one watchlist symbol
    async fn classify_symbol(
        &self,
        symbol: &str,
        thresholds: &ThresholdSet,
        price_cache: &mut HashMap<String, ReconciledPrice>,
    ) -> Result<(Action, Decimal, f64), EngineError> {
        let history = match self
            .primary
            .daily_history(symbol, self.settings.lookback_days)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!(%symbol, source = self.primary.name(), error = %e, "History fetch failed");
                return Err(EngineError::NoPriceAvailable {
                    symbol: symbol.to_string(),
                });
            }
        };

        let snapshot = indicators::compute(symbol, &history)?;

        let reconciled = match price_cache.get(symbol) {
            Some(price) => price.clone(),
            None => {
                let price = self
                    .fetch_reconciled(symbol, history.last().map(|c| c.close))
                    .await?;
                price_cache.insert(symbol.to_string(), price.clone());
                price
            }
        };

        let action = classifier::classify(&snapshot, &reconciled, thresholds);
        Ok((action, reconciled.value, snapshot.momentum))
    }

    /// One alert per actionable classification, annotated with the day's
    /// top headline when a news client is configured
    async fn announce(&self, symbol: &str, action: Action, price: Decimal, momentum: f64) {
        let headline = match &self.headlines {
            Some(client) => client.top_headline(symbol).await,
            None => market_data::NO_NEWS_SENTINEL.to_string(),
        };
        self.notifier
            .send(&format!(
                "{} {} ({}) at {} | momentum {:.1} | {}",
                action,
                company_name(symbol),
                symbol,
                price,
                momentum,
                headline
            ))
            .await;
    }

    async fn log_source_health(&self) {
        let health = self.primary.health().await;
        info!(
            source = %health.source,
            healthy = health.is_healthy,
            success_rate = health.success_rate,
            latency_ms = health.avg_latency_ms,
            "Source health"
        );
        if let Some(secondary) = &self.secondary {
            let health = secondary.health().await;
            info!(
                source = %health.source,
                healthy = health.is_healthy,
                success_rate = health.success_rate,
                latency_ms = health.avg_latency_ms,
                "Source health"
            );
        }
    }
}
