use std::sync::Arc;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::llm_client::LlmClient;
use crate::scrape::ScrapeOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub scraper: Arc<ScrapeOrchestrator>,
    /// Root token cancelled on shutdown; in-flight scrapes run under child tokens.
    pub shutdown: CancellationToken,
}
