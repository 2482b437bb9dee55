//! Best-effort alert delivery over a webhook

use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Sends alert text to a configured webhook. Delivery is best-effort by
/// contract: a failed send is logged and swallowed, never fatal to the run.
/// With no webhook configured, alerts still land in the log.
pub struct AlertNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl AlertNotifier {
    pub fn new(webhook_url: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, webhook_url })
    }

    pub async fn send(&self, text: &str) {
        info!(alert = %text, "ALERT");

        let Some(url) = &self.webhook_url else {
            return;
        };

        let payload = serde_json::json!({ "text": text });
        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                warn!(status = %response.status(), "Alert webhook rejected message");
            }
            Err(e) => {
                warn!(error = %e, "Failed to deliver alert");
            }
        }
    }
}
