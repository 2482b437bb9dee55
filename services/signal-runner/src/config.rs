//! Runner configuration
//!
//! Settings come from an optional `signal-runner.toml` next to the binary,
//! overridden by `SIGNAL_RUNNER_*` environment variables. Watchlist
//! selection itself is somebody else's job; this just reads the list.

use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Directory under the home dir holding the journal and ledger
const DEFAULT_DATA_DIR: &str = ".signal-runner";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Symbols analyzed each run
    pub watchlist: Vec<String>,
    /// Where journal.csv and brain.json live
    pub data_dir: PathBuf,
    /// Trading days of history requested from the primary source
    pub lookback_days: usize,
    /// Politeness delay between consecutive external-source calls.
    /// A throttle for free-tier rate limits, not a correctness requirement.
    pub fetch_delay_ms: u64,
    /// Enables the authoritative secondary source and headlines
    pub alpha_vantage_api_key: Option<String>,
    /// Alert delivery target; alerts are log-only without it
    pub alert_webhook_url: Option<String>,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let default_data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR);

        let settings = Config::builder()
            .set_default("watchlist", vec!["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"])?
            .set_default("data_dir", default_data_dir.to_string_lossy().as_ref())?
            .set_default("lookback_days", 260_i64)?
            .set_default("fetch_delay_ms", 1_500_i64)?
            .add_source(File::with_name("signal-runner").required(false))
            .add_source(
                Environment::with_prefix("SIGNAL_RUNNER")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("watchlist"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join("journal.csv")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("brain.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_file_or_env() {
        let settings = Settings::load().unwrap();
        assert!(!settings.watchlist.is_empty());
        assert_eq!(settings.lookback_days, 260);
        assert_eq!(settings.fetch_delay(), Duration::from_millis(1_500));
        assert!(settings.journal_path().ends_with("journal.csv"));
        assert!(settings.ledger_path().ends_with("brain.json"));
    }
}
