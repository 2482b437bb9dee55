//! Best-effort headline lookup used to annotate alerts.
//!
//! News never feeds the decision logic, so this client swallows its own
//! failures and falls back to a sentinel the alert text can carry as-is.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const NEWS_BASE: &str = "https://www.alphavantage.co/query";

/// Sentinel returned when no headline could be retrieved
pub const NO_NEWS_SENTINEL: &str = "No News Found";

/// Client for the Alpha Vantage news endpoint
pub struct HeadlineClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HeadlineClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, NEWS_BASE.to_string())
    }

    /// Create with a custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            api_key,
        }
    }

    /// Top headline for a symbol, or the sentinel when none is available
    pub async fn top_headline(&self, symbol: &str) -> String {
        match self.fetch_top(symbol).await {
            Ok(Some(title)) => title,
            Ok(None) => NO_NEWS_SENTINEL.to_string(),
            Err(e) => {
                debug!("Headline lookup for {} failed: {}", symbol, e);
                NO_NEWS_SENTINEL.to_string()
            }
        }
    }

    async fn fetch_top(&self, symbol: &str) -> Result<Option<String>> {
        let url = format!(
            "{}?function=NEWS_SENTIMENT&tickers={}&limit=1&apikey={}",
            self.base_url, symbol, self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send news request")?;

        if !response.status().is_success() {
            anyhow::bail!("news API error: {}", response.status());
        }

        let value: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse news response")?;

        Ok(value
            .get("feed")
            .and_then(|f| f.as_array())
            .and_then(|a| a.first())
            .and_then(|item| item.get("title"))
            .and_then(|t| t.as_str())
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HeadlineClient {
        HeadlineClient::with_base_url("demo".to_string(), format!("{}/query", server.uri()))
    }

    #[tokio::test]
    async fn test_returns_first_feed_title() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "feed": [
                { "title": "Apple unveils new chip" },
                { "title": "Second story" }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "NEWS_SENTIMENT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let headline = client_for(&server).top_headline("AAPL").await;
        assert_eq!(headline, "Apple unveils new chip");
    }

    #[tokio::test]
    async fn test_empty_feed_yields_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"feed": []})))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).top_headline("AAPL").await, NO_NEWS_SENTINEL);
    }

    #[tokio::test]
    async fn test_http_failure_yields_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).top_headline("AAPL").await, NO_NEWS_SENTINEL);
    }
}
