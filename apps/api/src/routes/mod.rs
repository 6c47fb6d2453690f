pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::companies::handlers as companies;
use crate::cv::handlers as cv;
use crate::job_posts::{community, handlers as job_posts};
use crate::records::{resource_routes, ListFilter};
use crate::state::AppState;
use crate::store::Table;

/// Upload limit for CV files (axum defaults to 2 MB).
const CV_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Companies
        .route(
            "/api/v1/linkedin/company",
            post(companies::handle_linkedin_company),
        )
        .route(
            "/api/v1/company-data/gpt",
            post(companies::handle_company_data),
        )
        .merge(resource_routes(Table::Companies, "/api/v1/companies", None))
        // Assessments & use cases
        .merge(resource_routes(
            Table::Assessments,
            "/api/v1/assessment",
            Some(ListFilter {
                param: "companyId",
                column: "company_id",
            }),
        ))
        .merge(resource_routes(
            Table::UseCases,
            "/api/v1/use-cases",
            Some(ListFilter {
                param: "assessmentId",
                column: "assessment_id",
            }),
        ))
        // Job descriptions
        .route(
            "/api/v1/job-descriptions",
            get(job_posts::handle_get_job_posts).post(job_posts::handle_create_job_post),
        )
        .route(
            "/api/v1/job-descriptions/generate",
            post(job_posts::handle_generate_job_description),
        )
        .route(
            "/api/v1/community-posting",
            post(community::handle_community_posting),
        )
        // CVs
        .route(
            "/api/v1/cv-generation",
            post(cv::handle_cv_generation).layer(DefaultBodyLimit::max(CV_UPLOAD_LIMIT)),
        )
        .route(
            "/api/v1/training-recommendations",
            post(cv::handle_training_recommendations),
        )
        .with_state(state)
}
