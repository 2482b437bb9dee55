//! Signal Runner - entry point
//!
//! One invocation performs one full run (review, then classify) and exits.
//! A non-zero status tells the scheduler the run failed; a best-effort
//! failure alert goes out first.

use market_data::{AlphaVantageClient, EquityDataSource, HeadlineClient, YahooFinanceClient};
use signal_runner::config::Settings;
use signal_runner::notifier::AlertNotifier;
use signal_runner::runner::SignalRunner;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Signal Runner...");

    let settings = Settings::load()?;
    info!(
        watchlist = ?settings.watchlist,
        data_dir = %settings.data_dir.display(),
        "Configuration loaded"
    );

    let primary: Arc<dyn EquityDataSource> = Arc::new(YahooFinanceClient::new());
    info!("✓ Yahoo Finance client initialized");

    let secondary: Option<Arc<dyn EquityDataSource>> = match settings.alpha_vantage_api_key.clone()
    {
        Some(key) => {
            info!("✓ Alpha Vantage client initialized");
            Some(Arc::new(AlphaVantageClient::new(key)))
        }
        None => {
            warn!("⚠ No Alpha Vantage API key; prices run single-source and unverified");
            None
        }
    };

    let headlines = settings.alpha_vantage_api_key.clone().map(HeadlineClient::new);
    let notifier = AlertNotifier::new(settings.alert_webhook_url.clone())?;

    let runner = SignalRunner::new(settings, primary, secondary, headlines, notifier);

    match runner.run_once().await {
        Ok(report) => {
            info!(run_id = %report.run_id, "Signal run finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Signal run failed");
            runner
                .notifier()
                .send(&format!("🚨 Signal run failed: {}", e))
                .await;
            std::process::exit(1);
        }
    }
}
