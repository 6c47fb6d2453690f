use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::cv::extract::{cv_text, Upload};
use crate::cv::prompts::{
    CV_OPTIMIZATION_PROMPT_TEMPLATE, CV_OPTIMIZATION_ROLE, TRAINING_PROMPT_TEMPLATE,
    TRAINING_ROLE,
};
use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::CompletionOptions;
use crate::state::AppState;
use crate::store::{self, Table};

/// Completion-service verdict on a CV against a job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvOptimization {
    #[serde(default)]
    pub optimized_cv: String,
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub improvement_areas: Value,
}

#[derive(Debug, Serialize)]
pub struct CvOptimizationResponse {
    #[serde(flatten)]
    pub optimization: CvOptimization,
    pub id: Option<Value>,
}

/// Fields pulled out of the multipart form.
#[derive(Debug, Default)]
struct CvForm {
    cv: Option<Upload>,
    job_description: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<CvForm, AppError> {
    let mut form = CvForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("cv") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read CV upload: {e}")))?;
                form.cv = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("jobDescription") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job description: {e}"))
                })?;
                form.job_description = Some(text);
            }
            _ => {}
        }
    }
    Ok(form)
}

fn cv_record(cv_text: &str, job_description: &str, optimization: &CvOptimization) -> Value {
    json!({
        "original_cv": cv_text,
        "job_description": job_description,
        "optimized_cv": optimization.optimized_cv,
        "skill_gaps": optimization.skill_gaps,
        "relevance_score": optimization.relevance_score,
        "improvement_areas": optimization.improvement_areas,
    })
}

/// POST /api/v1/cv-generation
///
/// Multipart form: `cv` (file, PDF or text) and `jobDescription` (text).
/// The result is stored, but a storage failure does not fail the request.
pub async fn handle_cv_generation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CvOptimizationResponse>, AppError> {
    let form = read_form(multipart).await?;
    let (upload, job_description) = match (form.cv, form.job_description) {
        (Some(upload), Some(jd)) if !upload.bytes.is_empty() && !jd.trim().is_empty() => {
            (upload, jd)
        }
        _ => {
            return Err(AppError::Validation(
                "CV file and job description are required".to_string(),
            ))
        }
    };

    let cv = tokio::task::spawn_blocking(move || cv_text(&upload))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    info!(cv_chars = cv.len(), "Optimizing CV against job description");

    let prompt = CV_OPTIMIZATION_PROMPT_TEMPLATE
        .replace("{cv_text}", &cv)
        .replace("{job_description}", &job_description);
    let system = json_system(CV_OPTIMIZATION_ROLE);
    let optimization: CvOptimization = state
        .llm
        .complete_json(&prompt, &CompletionOptions::new(&system).temperature(0.5))
        .await
        .map_err(|e| AppError::Llm(format!("CV optimization failed: {e}")))?;

    let record = cv_record(&cv, &job_description, &optimization);
    let id = match store::insert(&state.db, Table::CvOptimizations, &record).await {
        Ok(row) => row.get("id").cloned(),
        Err(e) => {
            error!("Error storing CV optimization: {e}");
            None
        }
    };

    Ok(Json(CvOptimizationResponse { optimization, id }))
}

#[derive(Debug, Deserialize)]
pub struct TrainingRequest {
    #[serde(default)]
    pub skill_gaps: Vec<String>,
}

/// POST /api/v1/training-recommendations
///
/// Returns the completion service's recommendations verbatim.
pub async fn handle_training_recommendations(
    State(state): State<AppState>,
    Json(request): Json<TrainingRequest>,
) -> Result<Json<Value>, AppError> {
    let skills: Vec<&str> = request
        .skill_gaps
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        return Err(AppError::Validation(
            "Skill gaps array is required".to_string(),
        ));
    }

    let prompt = TRAINING_PROMPT_TEMPLATE.replace("{skills}", &skills.join(", "));
    let system = json_system(TRAINING_ROLE);
    let recommendations: Value = state
        .llm
        .complete_json(&prompt, &CompletionOptions::new(&system).temperature(0.5))
        .await
        .map_err(|e| AppError::Llm(format!("Training recommendations failed: {e}")))?;

    Ok(Json(recommendations))
}
