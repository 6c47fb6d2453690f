//! Axum route handlers for the job description API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::job_posts::generate::{build_prompt, parse_generated_jd, GeneratedJd, JobDetails};
use crate::job_posts::prompts::JD_GENERATION_SYSTEM;
use crate::llm_client::CompletionOptions;
use crate::state::AppState;
use crate::store::{self, Table};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateJobPostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

impl CreateJobPostRequest {
    /// Row written to `job_posts`. New posts always start as drafts.
    fn into_record(self) -> Result<Value, AppError> {
        let mut record = serde_json::to_value(self).map_err(|e| AppError::Internal(e.into()))?;
        record["status"] = Value::from("draft");
        Ok(record)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateJobPostResponse {
    pub message: String,
    pub job: Value,
}

#[derive(Debug, Deserialize)]
pub struct JobPostQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateJdRequest {
    pub company: Option<Value>,
    #[serde(default)]
    pub job_details: JobDetails,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/job-descriptions
pub async fn handle_create_job_post(
    State(state): State<AppState>,
    Json(request): Json<CreateJobPostRequest>,
) -> Result<Json<CreateJobPostResponse>, AppError> {
    if request.title.trim().is_empty() || request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Title and description are required".to_string(),
        ));
    }

    let job = store::insert(&state.db, Table::JobPosts, &request.into_record()?).await?;

    Ok(Json(CreateJobPostResponse {
        message: "Job description created successfully".to_string(),
        job,
    }))
}

/// GET /api/v1/job-descriptions[?id=]
///
/// Single post when `id` is given, otherwise every post newest first.
/// Each post carries its company under `companies`.
pub async fn handle_get_job_posts(
    State(state): State<AppState>,
    Query(query): Query<JobPostQuery>,
) -> Result<Json<Value>, AppError> {
    const SELECT_WITH_COMPANY: &str = r#"
        SELECT to_jsonb(j) || jsonb_build_object('companies', to_jsonb(c))
        FROM job_posts j
        LEFT JOIN companies c ON c.id = j.company_id
    "#;

    match query.id {
        Some(id) => {
            let post: Option<Value> =
                sqlx::query_scalar(&format!("{SELECT_WITH_COMPANY} WHERE j.id = $1"))
                    .bind(id)
                    .fetch_optional(&state.db)
                    .await?;
            post.map(Json)
                .ok_or_else(|| AppError::NotFound("Job description not found".to_string()))
        }
        None => {
            let posts: Vec<Value> =
                sqlx::query_scalar(&format!("{SELECT_WITH_COMPANY} ORDER BY j.created_at DESC"))
                    .fetch_all(&state.db)
                    .await?;
            Ok(Json(Value::Array(posts)))
        }
    }
}

/// POST /api/v1/job-descriptions/generate
///
/// Drafts description, responsibilities, and requirements. Nothing is stored.
pub async fn handle_generate_job_description(
    State(state): State<AppState>,
    Json(request): Json<GenerateJdRequest>,
) -> Result<Json<GeneratedJd>, AppError> {
    if request.job_details.title.trim().is_empty() {
        return Err(AppError::Validation("Job title is required".to_string()));
    }

    let prompt = build_prompt(request.company.as_ref(), &request.job_details);
    let text = state
        .llm
        .complete(
            &prompt,
            &CompletionOptions::new(JD_GENERATION_SYSTEM).temperature(0.7),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Job description generation failed: {e}")))?;

    Ok(Json(parse_generated_jd(&text)))
}
