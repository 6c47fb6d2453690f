use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::scrape::error::{Result, ScrapeError};
use crate::scrape::types::{ApiResponse, CompanyScraperInput, RunData, RunStatus};

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for fetchclub/linkedin-company-profiles-scraper.
pub const DEFAULT_ACTOR_ID: &str = "fetchclub~linkedin-company-profiles-scraper";

/// Everything the scrape module needs to talk to Apify. Built once at startup.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub actor_id: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            actor_id: DEFAULT_ACTOR_ID.to_string(),
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
        }
    }
}

/// An asynchronous task-execution backend. The orchestrator only talks to this trait.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Starts a run of the configured actor and returns its run id.
    async fn start_run(&self, input: &CompanyScraperInput) -> Result<String>;

    async fn run_status(&self, run_id: &str) -> Result<RunStatus>;

    /// Items of the run's default dataset, in order.
    async fn run_items(&self, run_id: &str) -> Result<Vec<Value>>;

    async fn abort_run(&self, run_id: &str) -> Result<()>;
}

/// Apify REST implementation of `TaskRunner`.
pub struct ApifyTaskRunner {
    client: Client,
    token: Option<String>,
    base_url: String,
    actor_id: String,
}

impl ApifyTaskRunner {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            client: Client::new(),
            token: config.api_token.clone().filter(|t| !t.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            actor_id: config.actor_id.clone(),
        }
    }

    fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            ScrapeError::Configuration("APIFY_API_TOKEN is not set".to_string())
        })
    }

    fn runs_url(&self) -> String {
        format!("{}/acts/{}/runs", self.base_url, self.actor_id)
    }

    fn run_url(&self, run_id: &str) -> String {
        format!("{}/actor-runs/{}", self.base_url, run_id)
    }
}

/// Fails with `ServiceUnavailable` carrying the status text for non-2xx responses.
async fn ensure_success(resp: Response, action: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    debug!(%status, body = %body, "Apify request failed");
    Err(ScrapeError::ServiceUnavailable(format!(
        "Failed to {action}: {}",
        status.canonical_reason().unwrap_or(status.as_str())
    )))
}

#[async_trait]
impl TaskRunner for ApifyTaskRunner {
    async fn start_run(&self, input: &CompanyScraperInput) -> Result<String> {
        let token = self.token()?;
        let resp = self
            .client
            .post(self.runs_url())
            .query(&[("token", token)])
            .json(input)
            .send()
            .await?;
        let resp = ensure_success(resp, "start Apify task").await?;

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        api_resp
            .data
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ScrapeError::MalformedResponse("run id missing".to_string()))
    }

    async fn run_status(&self, run_id: &str) -> Result<RunStatus> {
        let token = self.token()?;
        let resp = self
            .client
            .get(self.run_url(run_id))
            .query(&[("token", token)])
            .send()
            .await?;
        let resp = ensure_success(resp, "check run status").await?;

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        parse_status(api_resp.data.status)
    }

    async fn run_items(&self, run_id: &str) -> Result<Vec<Value>> {
        let token = self.token()?;
        let resp = self
            .client
            .get(format!("{}/dataset/items", self.run_url(run_id)))
            .query(&[("token", token)])
            .send()
            .await?;
        let resp = ensure_success(resp, "fetch dataset").await?;

        Ok(resp.json().await?)
    }

    async fn abort_run(&self, run_id: &str) -> Result<()> {
        let token = self.token()?;
        let resp = self
            .client
            .post(format!("{}/abort", self.run_url(run_id)))
            .query(&[("token", token)])
            .send()
            .await?;
        ensure_success(resp, "abort run").await?;
        Ok(())
    }
}

fn parse_status(status: Option<String>) -> Result<RunStatus> {
    let status =
        status.ok_or_else(|| ScrapeError::MalformedResponse("run status missing".to_string()))?;
    status.parse().map_err(ScrapeError::MalformedResponse)
}
