use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Input for the LinkedIn company profile scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyScraperInput {
    pub company_profile_urls: Vec<String>,
    pub proxy_group: String,
}

impl CompanyScraperInput {
    pub fn for_url(url: &str) -> Self {
        Self {
            company_profile_urls: vec![url.to_string()],
            proxy_group: "DATACENTER".to_string(),
        }
    }
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Actor run metadata. Both fields are optional on the wire so that a missing
/// value surfaces as a malformed response instead of a generic decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: Option<String>,
    pub status: Option<String>,
}

/// Actor run status, mirroring the Apify vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "READY",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::TimingOut => "TIMING-OUT",
            RunStatus::TimedOut => "TIMED-OUT",
            RunStatus::Aborting => "ABORTING",
            RunStatus::Aborted => "ABORTED",
        }
    }

    /// Terminal statuses that mean the run produced no usable result.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::TimedOut | RunStatus::Aborted
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READY" | "PENDING" => Ok(RunStatus::Pending),
            "RUNNING" => Ok(RunStatus::Running),
            "SUCCEEDED" => Ok(RunStatus::Succeeded),
            "FAILED" => Ok(RunStatus::Failed),
            "TIMING-OUT" => Ok(RunStatus::TimingOut),
            "TIMED-OUT" => Ok(RunStatus::TimedOut),
            "ABORTING" => Ok(RunStatus::Aborting),
            "ABORTED" => Ok(RunStatus::Aborted),
            other => Err(format!("unknown run status '{other}'")),
        }
    }
}

/// Normalized company record produced from a scraped LinkedIn profile.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyProfile {
    pub name: String,
    pub website_url: String,
    pub industry: String,
    pub employee_count: Option<u64>,
    pub location: String,
    pub raw_source_data: Value,
    pub retrieved_at: DateTime<Utc>,
}

impl CompanyProfile {
    /// Shape of the `companies` row written for this profile.
    pub fn to_company_record(&self) -> Value {
        json!({
            "name": self.name,
            "website_url": self.website_url,
            "industry": self.industry,
            "size": self.employee_count,
            "employee_count": self.employee_count,
            "location": self.location,
            "last_updated": self.retrieved_at,
            "apify_data": self.raw_source_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_parses_apify_vocabulary() {
        assert_eq!("READY".parse::<RunStatus>().unwrap(), RunStatus::Pending);
        assert_eq!("PENDING".parse::<RunStatus>().unwrap(), RunStatus::Pending);
        assert_eq!("RUNNING".parse::<RunStatus>().unwrap(), RunStatus::Running);
        assert_eq!(
            "TIMED-OUT".parse::<RunStatus>().unwrap(),
            RunStatus::TimedOut
        );
        assert!("EXPLODED".parse::<RunStatus>().is_err());
    }

    #[test]
    fn test_only_terminal_failures_are_failures() {
        assert!(RunStatus::Failed.is_failure());
        assert!(RunStatus::Aborted.is_failure());
        assert!(RunStatus::TimedOut.is_failure());
        assert!(!RunStatus::Aborting.is_failure());
        assert!(!RunStatus::Running.is_failure());
        assert!(!RunStatus::Succeeded.is_failure());
    }

    #[test]
    fn test_scraper_input_serializes_to_actor_contract() {
        let input = CompanyScraperInput::for_url("https://www.linkedin.com/company/acme");
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({
                "company_profile_urls": ["https://www.linkedin.com/company/acme"],
                "proxy_group": "DATACENTER"
            })
        );
    }

    #[test]
    fn test_company_record_uses_table_columns() {
        let profile = CompanyProfile {
            name: "Acme".to_string(),
            website_url: "https://acme.test".to_string(),
            industry: "Manufacturing".to_string(),
            employee_count: Some(51),
            location: "Sydney".to_string(),
            raw_source_data: json!({"company_name": "Acme"}),
            retrieved_at: Utc::now(),
        };
        let record = profile.to_company_record();
        assert_eq!(record["size"], json!(51));
        assert_eq!(record["employee_count"], json!(51));
        assert_eq!(record["apify_data"]["company_name"], "Acme");
        assert!(record.get("raw_source_data").is_none());
    }
}
