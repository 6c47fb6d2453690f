use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::companies::prompts::{COMPANY_SUMMARY_PROMPT_TEMPLATE, COMPANY_SUMMARY_ROLE};
use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{CompletionOptions, MODEL};
use crate::scrape::company_profile_url;
use crate::state::AppState;
use crate::store::{self, Table};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInCompanyRequest {
    #[serde(default)]
    pub company_url: String,
}

#[derive(Debug, Serialize)]
pub struct LinkedInCompanyResponse {
    pub message: String,
    pub company: Value,
}

/// POST /api/v1/linkedin/company
///
/// Scrapes a LinkedIn company profile (URL or bare company name) and stores it.
pub async fn handle_linkedin_company(
    State(state): State<AppState>,
    Json(req): Json<LinkedInCompanyRequest>,
) -> Result<Json<LinkedInCompanyResponse>, AppError> {
    if req.company_url.trim().is_empty() {
        return Err(AppError::Validation(
            "Company URL or name is required".to_string(),
        ));
    }

    let url = company_profile_url(&req.company_url);
    let profile = state
        .scraper
        .fetch_detached(url.clone(), &state.shutdown)
        .await?
        .ok_or_else(|| AppError::NotFound("No data found for this company".to_string()))?;

    info!(%url, name = %profile.name, "Saving scraped company profile");
    let company = store::insert(&state.db, Table::Companies, &profile.to_company_record()).await?;

    Ok(Json(LinkedInCompanyResponse {
        message: "Company data scraped and saved successfully".to_string(),
        company,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDataRequest {
    pub company_url: Option<String>,
    pub company_name: Option<String>,
}

impl CompanyDataRequest {
    /// Describes the company for the prompt, or `None` when neither field is usable.
    fn subject(&self) -> Option<String> {
        let name = non_blank(self.company_name.as_deref());
        let url = non_blank(self.company_url.as_deref());
        match (name, url) {
            (Some(name), Some(url)) => Some(format!(
                "a company called {name}. Their website or LinkedIn page is: {url}"
            )),
            (Some(name), None) => Some(format!("a company called {name}")),
            (None, Some(url)) => Some(format!(
                "a company. Their website or LinkedIn page is: {url}"
            )),
            (None, None) => None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Company summary as returned by the completion service. Values are kept loose
/// because the model is free to answer "Unknown" or a number.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CompanySummary {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub industry: Value,
    #[serde(default)]
    pub size: Value,
    #[serde(default)]
    pub location: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub products_services: Value,
    #[serde(default)]
    pub year_founded: Value,
}

#[derive(Debug, Serialize)]
pub struct CompanyDataCompany {
    #[serde(flatten)]
    pub summary: CompanySummary,
    pub data_source: String,
    pub retrieved_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CompanyDataResponse {
    pub source: &'static str,
    pub company: CompanyDataCompany,
}

/// POST /api/v1/company-data/gpt
///
/// Completion-service fallback used by the UI when scraping is unavailable.
pub async fn handle_company_data(
    State(state): State<AppState>,
    Json(req): Json<CompanyDataRequest>,
) -> Result<Json<CompanyDataResponse>, AppError> {
    let subject = req.subject().ok_or_else(|| {
        AppError::Validation("Company URL or name is required".to_string())
    })?;

    let prompt = COMPANY_SUMMARY_PROMPT_TEMPLATE.replace("{subject}", &subject);
    let system = json_system(COMPANY_SUMMARY_ROLE);
    let summary: CompanySummary = state
        .llm
        .complete_json(&prompt, &CompletionOptions::new(&system).temperature(0.3))
        .await
        .map_err(|e| AppError::Llm(format!("Company summary failed: {e}")))?;

    Ok(Json(CompanyDataResponse {
        source: "gpt",
        company: CompanyDataCompany {
            summary,
            data_source: MODEL.to_string(),
            retrieved_at: Utc::now(),
        },
    }))
}
