//! Octagon financial-data agent client
//!
//! Two natural-language queries go through this gateway: symbol lookup
//! (company name → primary ticker or "PRIVATE") and quarterly 13-F holdings
//! summaries. Replies come back as assistant text; holdings replies carry a
//! JSON array of snapshot rows that must be parsed defensively.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::info;

use crate::error::ProfileError;
use crate::models::HoldingsSnapshot;
use crate::retry::{transient_http, RetryPolicy};
use crate::Result;

/// Fixed per-attempt request timeout.
const OCTAGON_TIMEOUT: Duration = Duration::from_secs(40);

const DEFAULT_BASE_URL: &str = "https://api-gateway.octagonagents.com/v1";

const SYMBOL_LOOKUP_MODEL: &str = "octagon-stock-data-agent";
const HOLDINGS_MODEL: &str = "octagon-holdings-agent";

/// Prior filing quarter-end; the row carrying this date becomes the
/// "previous" snapshot for quarter-on-quarter comparisons.
pub const PREVIOUS_QUARTER_END: &str = "2024-09-30";

/// Trait for the financial-data agent API
#[async_trait]
pub trait FinanceAgent: Send + Sync {
    /// Resolve a company name to its primary ticker symbol.
    /// Returns the raw reply text ("GOOG", "PRIVATE", ...).
    async fn symbol_lookup(&self, company: &str) -> Result<String>;

    /// Fetch quarterly 13-F snapshot rows for a ticker, most recent first.
    async fn holdings_summary(&self, ticker: &str) -> Result<Vec<HoldingsSnapshot>>;
}

/// Reusable Octagon gateway client (connection-pooled)
pub struct OctagonClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl OctagonClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(OCTAGON_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    /// Build from the `OCTAGON_API_KEY` environment variable.
    pub fn from_env() -> Self {
        Self::new(env::var("OCTAGON_API_KEY").unwrap_or_default())
    }

    /// Send one natural-language query to the named agent model and join the
    /// reply text parts into a single string.
    async fn ask(&self, model: &str, input: &str) -> Result<String> {
        let url = format!("{}/responses", self.base_url);
        let body = AgentRequest {
            model: model.to_string(),
            input: input.to_string(),
        };

        let response = self
            .retry
            .run("octagon:responses", transient_http, || {
                let request = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&body);

                async move {
                    request
                        .send()
                        .await?
                        .error_for_status()?
                        .json::<AgentResponse>()
                        .await
                }
            })
            .await?;

        Ok(response.text())
    }
}

#[async_trait]
impl FinanceAgent for OctagonClient {
    async fn symbol_lookup(&self, company: &str) -> Result<String> {
        let query = format!(
            "Return ONLY the primary stock-ticker symbol for the company named '{}'. \
             If it is not publicly traded, reply 'PRIVATE'.",
            company
        );

        info!("Looking up ticker symbol for {}", company);
        self.ask(SYMBOL_LOOKUP_MODEL, &query).await
    }

    async fn holdings_summary(&self, ticker: &str) -> Result<Vec<HoldingsSnapshot>> {
        let query = format!(
            "Get a summary of institutional positions for {} \
             for Q4 2024 (current) and Q3 2024 (previous). Respond in JSON.",
            ticker
        );

        info!("Fetching 13-F holdings for {}", ticker);
        let raw = self.ask(HOLDINGS_MODEL, &query).await?;

        serde_json::from_str(raw.trim()).map_err(|e| {
            ProfileError::HoldingsError(format!("Malformed holdings reply for {}: {}", ticker, e))
        })
    }
}

#[derive(Debug, Serialize)]
struct AgentRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct AgentResponse {
    #[serde(default)]
    output: Vec<AgentOutput>,
}

#[derive(Debug, Deserialize)]
struct AgentOutput {
    #[serde(default)]
    content: Vec<AgentContent>,
}

#[derive(Debug, Deserialize)]
struct AgentContent {
    #[serde(default)]
    text: String,
}

impl AgentResponse {
    /// Concatenated text of the first output's content parts, trimmed.
    fn text(&self) -> String {
        self.output
            .first()
            .map(|o| {
                o.content
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_text_extraction() {
        let response: AgentResponse = serde_json::from_value(json!({
            "output": [
                {"content": [{"text": "GO"}, {"text": "OG"}]},
                {"content": [{"text": "ignored"}]}
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), "GOOG");
    }

    #[test]
    fn test_reply_text_empty_output() {
        let response: AgentResponse = serde_json::from_value(json!({"output": []})).unwrap();
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_holdings_rows_parse() {
        let raw = json!([
            {"date": "2024-12-31", "investorsHolding": 5000, "ownershipPercent": 61.2},
            {"date": "2024-09-30", "investorsHolding": 4800}
        ])
        .to_string();

        let rows: Vec<HoldingsSnapshot> = serde_json::from_str(&raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-12-31");
        assert_eq!(rows[1].investors_holding, Some(4800.0));
    }
}
