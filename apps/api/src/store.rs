//! Data store: simple filtered CRUD over the application tables.
//!
//! Rows travel as JSON (`to_jsonb(row)`) so handlers can pass request bodies straight
//! through. Table and column names only ever come from the closed `Table` enum; request
//! keys are checked against its whitelist before any SQL is built.

use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;

/// Columns maintained by the database, silently ignored in write payloads.
const MANAGED_COLUMNS: &[&str] = &["id", "created_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Companies,
    Assessments,
    UseCases,
    JobPosts,
    CvOptimizations,
    CommunityIntegrations,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Companies => "companies",
            Table::Assessments => "assessments",
            Table::UseCases => "use_cases",
            Table::JobPosts => "job_posts",
            Table::CvOptimizations => "cv_optimizations",
            Table::CommunityIntegrations => "community_integrations",
        }
    }

    /// Writable columns, in table order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Companies => &[
                "name",
                "website_url",
                "industry",
                "size",
                "employee_count",
                "location",
                "description",
                "profile",
                "apify_data",
                "last_updated",
            ],
            Table::Assessments => &[
                "company_id",
                "title",
                "status",
                "responses",
                "readiness_score",
                "recommendations",
                "updated_at",
            ],
            Table::UseCases => &[
                "assessment_id",
                "name",
                "description",
                "department",
                "implementation_complexity",
                "expected_impact",
                "priority",
            ],
            Table::JobPosts => &[
                "company_id",
                "title",
                "description",
                "requirements",
                "responsibilities",
                "salary_range",
                "location",
                "job_type",
                "experience_level",
                "ai_tools",
                "skills",
                "status",
            ],
            Table::CvOptimizations => &[
                "original_cv",
                "job_description",
                "optimized_cv",
                "skill_gaps",
                "relevance_score",
                "improvement_areas",
            ],
            Table::CommunityIntegrations => &[
                "job_post_id",
                "platform",
                "post_status",
                "engagement_metrics",
            ],
        }
    }

    /// Label used in "not found" messages.
    pub fn label(self) -> &'static str {
        match self {
            Table::Companies => "Company",
            Table::Assessments => "Assessment",
            Table::UseCases => "Use case",
            Table::JobPosts => "Job description",
            Table::CvOptimizations => "CV optimization",
            Table::CommunityIntegrations => "Community integration",
        }
    }
}

/// Equality filter on a whitelisted column, compared as text.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

/// Returns the writable columns present in `record`, in table order.
/// Unknown keys are rejected; managed keys are ignored.
pub fn writable_columns(table: Table, record: &Value) -> Result<Vec<&'static str>, AppError> {
    let object: &Map<String, Value> = record
        .as_object()
        .ok_or_else(|| AppError::Validation("request body must be a JSON object".to_string()))?;

    let unknown: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|k| !MANAGED_COLUMNS.contains(k) && !table.columns().contains(k))
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Validation(format!(
            "unknown column(s) for {}: {}",
            table.name(),
            unknown.join(", ")
        )));
    }

    let columns: Vec<&'static str> = table
        .columns()
        .iter()
        .copied()
        .filter(|c| object.contains_key(*c))
        .collect();
    if columns.is_empty() {
        return Err(AppError::Validation(format!(
            "no writable fields supplied for {}",
            table.name()
        )));
    }
    Ok(columns)
}

fn list_sql(table: Table, filter: Option<&Filter>) -> String {
    let mut sql = format!("SELECT to_jsonb(t) FROM {} t", table.name());
    if let Some(filter) = filter {
        sql.push_str(&format!(" WHERE t.{}::text = $1", filter.column));
    }
    sql.push_str(" ORDER BY t.created_at DESC");
    sql
}

fn insert_sql(table: Table, columns: &[&str]) -> String {
    let cols = columns.join(", ");
    format!(
        "INSERT INTO {name} AS t ({cols}) \
         SELECT {cols} FROM jsonb_populate_record(NULL::{name}, $1) \
         RETURNING to_jsonb(t)",
        name = table.name(),
    )
}

fn update_sql(table: Table, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .map(|c| format!("{c} = r.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {name} AS t SET {assignments} \
         FROM jsonb_populate_record(NULL::{name}, $1) AS r \
         WHERE t.id = $2 \
         RETURNING to_jsonb(t)",
        name = table.name(),
    )
}

/// All rows of `table`, newest first, optionally filtered.
pub async fn list(
    pool: &PgPool,
    table: Table,
    filter: Option<&Filter>,
) -> Result<Vec<Value>, AppError> {
    let sql = list_sql(table, filter);
    let mut query = sqlx::query_scalar::<_, Value>(&sql);
    if let Some(filter) = filter {
        query = query.bind(&filter.value);
    }
    Ok(query.fetch_all(pool).await?)
}

pub async fn get(pool: &PgPool, table: Table, id: Uuid) -> Result<Option<Value>, AppError> {
    let sql = format!("SELECT to_jsonb(t) FROM {} t WHERE t.id = $1", table.name());
    Ok(sqlx::query_scalar::<_, Value>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Like `get`, but a missing row is a `NotFound` error.
pub async fn get_required(pool: &PgPool, table: Table, id: Uuid) -> Result<Value, AppError> {
    get(pool, table, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", table.label())))
}

pub async fn insert(pool: &PgPool, table: Table, record: &Value) -> Result<Value, AppError> {
    let columns = writable_columns(table, record)?;
    let sql = insert_sql(table, &columns);
    Ok(sqlx::query_scalar::<_, Value>(&sql)
        .bind(record)
        .fetch_one(pool)
        .await?)
}

/// Applies `patch` to the row with `id`. Returns `None` when no such row exists.
pub async fn update(
    pool: &PgPool,
    table: Table,
    id: Uuid,
    patch: &Value,
) -> Result<Option<Value>, AppError> {
    let columns = writable_columns(table, patch)?;
    let sql = update_sql(table, &columns);
    Ok(sqlx::query_scalar::<_, Value>(&sql)
        .bind(patch)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Deletes the row with `id`. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, table: Table, id: Uuid) -> Result<bool, AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", table.name());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
