//! Community posting: records one pending integration per requested platform.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{self, Table};

#[derive(Debug, Deserialize)]
pub struct CommunityPostingRequest {
    pub job_post_id: Option<Uuid>,
    #[serde(default)]
    pub platforms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlatformResult {
    pub platform: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommunityPostingResponse {
    pub message: String,
    pub results: Vec<PlatformResult>,
}

fn integration_record(job_post_id: Uuid, platform: &str) -> Value {
    json!({
        "job_post_id": job_post_id,
        "platform": platform,
        "post_status": "pending",
        "engagement_metrics": {},
    })
}

/// POST /api/v1/community-posting
///
/// A failure on one platform is reported in its result and does not stop the others.
pub async fn handle_community_posting(
    State(state): State<AppState>,
    Json(request): Json<CommunityPostingRequest>,
) -> Result<Json<CommunityPostingResponse>, AppError> {
    let job_post_id = match request.job_post_id {
        Some(id) if !request.platforms.is_empty() => id,
        _ => {
            return Err(AppError::Validation(
                "Job post ID and at least one platform are required".to_string(),
            ))
        }
    };

    store::get(&state.db, Table::JobPosts, job_post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job post not found".to_string()))?;

    let mut results = Vec::with_capacity(request.platforms.len());
    for platform in request.platforms {
        let record = integration_record(job_post_id, &platform);
        let result = match store::insert(&state.db, Table::CommunityIntegrations, &record).await {
            Ok(row) => PlatformResult {
                integration_id: row.get("id").cloned(),
                platform,
                success: true,
                error: None,
            },
            Err(e) => {
                warn!(%job_post_id, platform = %platform, "Failed to record community integration: {e}");
                PlatformResult {
                    platform,
                    success: false,
                    integration_id: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    Ok(Json(CommunityPostingResponse {
        message: "Community posting initiated".to_string(),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_record_starts_pending() {
        let id = Uuid::new_v4();
        let record = integration_record(id, "reddit");
        assert_eq!(record["post_status"], "pending");
        assert_eq!(record["platform"], "reddit");
        assert_eq!(record["job_post_id"], json!(id));
        assert_eq!(record["engagement_metrics"], json!({}));
        assert!(store::writable_columns(Table::CommunityIntegrations, &record).is_ok());
    }

    #[test]
    fn test_failed_platform_result_omits_integration_id() {
        let result = PlatformResult {
            platform: "slack".to_string(),
            success: false,
            integration_id: None,
            error: Some("boom".to_string()),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("integration_id").is_none());
        assert_eq!(value["error"], "boom");
    }
}
