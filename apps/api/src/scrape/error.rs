use thiserror::Error;

use crate::scrape::types::RunStatus;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scrape service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Malformed response from scrape service: {0}")]
    MalformedResponse(String),

    #[error("Scrape run failed with status: {0}")]
    UpstreamJobFailed(RunStatus),

    #[error("{} did not finish before the deadline", describe_run(.run_id))]
    TimedOut { run_id: Option<String> },

    #[error("{} was cancelled", describe_run(.run_id))]
    Cancelled { run_id: Option<String> },
}

/// Subject for run-scoped messages; a run abandoned before submission has no id yet.
fn describe_run(run_id: &Option<String>) -> String {
    match run_id {
        Some(id) => format!("Scrape run {id}"),
        None => "Scrape".to_string(),
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ScrapeError::MalformedResponse(err.to_string())
        } else {
            ScrapeError::ServiceUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeError::MalformedResponse(err.to_string())
    }
}
