//! PDS company-registry client
//!
//! Fetches structured corporate records (addresses, directors) by company
//! name from the PDS search API. Uses a long-lived reqwest::Client for
//! connection pooling; every request runs under the shared retry policy.

use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::SearchResponse;
use crate::retry::{transient_http, RetryPolicy};
use crate::Result;

/// Fixed per-attempt request timeout.
const PDS_TIMEOUT: Duration = Duration::from_secs(40);

const DEFAULT_BASE_URL: &str = "https://api.rel8ed.to";

/// Region qualifier sent with every search.
pub const DEFAULT_STATE: &str = "NY";

/// Trait for the corporate-record search API
#[async_trait]
pub trait CompanyRegistry: Send + Sync {
    /// Search for a company by name, qualified by state/province.
    async fn search(&self, company_name: &str, state: &str) -> Result<SearchResponse>;
}

/// Reusable PDS client (connection-pooled)
pub struct PdsClient {
    client: Client,
    base_url: String,
    token: String,
    retry: RetryPolicy,
}

impl PdsClient {
    pub fn new(base_url: String, token: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(PDS_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            retry: RetryPolicy::default(),
        }
    }

    /// Build from `PDS_BASE_URL` / `PDS_TOKEN` environment variables.
    pub fn from_env() -> Self {
        let base_url = env::var("PDS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let token = env::var("PDS_TOKEN").unwrap_or_else(|_| {
            warn!("PDS_TOKEN not set, registry requests will be unauthorized");
            String::new()
        });
        Self::new(base_url, token)
    }
}

#[async_trait]
impl CompanyRegistry for PdsClient {
    async fn search(&self, company_name: &str, state: &str) -> Result<SearchResponse> {
        let url = format!("{}/companies/search", self.base_url);

        info!("Fetching company record from PDS: {}", company_name);

        let response = self
            .retry
            .run("pds:search", transient_http, || {
                let request = self
                    .client
                    .post(&url)
                    .query(&[
                        ("searchType", "graphOnly"),
                        ("companyName", company_name),
                        ("stateProvince", state),
                    ])
                    .header("Authorization", &self.token)
                    .header("Accept", "application/json")
                    .header("Content-Type", "application/json");

                async move {
                    request
                        .send()
                        .await?
                        .error_for_status()?
                        .json::<SearchResponse>()
                        .await
                }
            })
            .await?;

        info!(
            "PDS returned {} record(s) for {}",
            response.result.len(),
            company_name
        );

        Ok(response)
    }
}
