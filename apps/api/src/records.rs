//! Generic CRUD routes for tables whose rows are passed through as JSON
//! (companies, assessments, use cases).

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{self, Filter, Table};

/// Maps a query-string parameter onto a column filter for list requests,
/// e.g. `?companyId=` → `company_id`.
#[derive(Debug, Clone, Copy)]
pub struct ListFilter {
    pub param: &'static str,
    pub column: &'static str,
}

impl ListFilter {
    fn from_params(self, params: &HashMap<String, String>) -> Option<Filter> {
        params
            .get(self.param)
            .filter(|v| !v.trim().is_empty())
            .map(|v| Filter {
                column: self.column,
                value: v.clone(),
            })
    }
}

/// `GET/POST {path}` and `GET/PATCH/DELETE {path}/:id` for `table`.
pub fn resource_routes(
    table: Table,
    path: &str,
    list_filter: Option<ListFilter>,
) -> Router<AppState> {
    Router::new()
        .route(
            path,
            get(
                move |State(state): State<AppState>,
                      Query(params): Query<HashMap<String, String>>| async move {
                    let filter = list_filter.and_then(|f| f.from_params(&params));
                    list_rows(&state, table, filter.as_ref()).await
                },
            )
            .post(
                move |State(state): State<AppState>, Json(body): Json<Value>| async move {
                    create_row(&state, table, &body).await
                },
            ),
        )
        .route(
            &format!("{path}/:id"),
            get(
                move |State(state): State<AppState>, Path(id): Path<Uuid>| async move {
                    get_row(&state, table, id).await
                },
            )
            .patch(
                move |State(state): State<AppState>,
                      Path(id): Path<Uuid>,
                      Json(body): Json<Value>| async move {
                    update_row(&state, table, id, &body).await
                },
            )
            .delete(
                move |State(state): State<AppState>, Path(id): Path<Uuid>| async move {
                    delete_row(&state, table, id).await
                },
            ),
        )
}

async fn list_rows(
    state: &AppState,
    table: Table,
    filter: Option<&Filter>,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(store::list(&state.db, table, filter).await?))
}

async fn get_row(state: &AppState, table: Table, id: Uuid) -> Result<Json<Value>, AppError> {
    Ok(Json(store::get_required(&state.db, table, id).await?))
}

async fn create_row(
    state: &AppState,
    table: Table,
    body: &Value,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let row = store::insert(&state.db, table, body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

async fn update_row(
    state: &AppState,
    table: Table,
    id: Uuid,
    body: &Value,
) -> Result<Json<Value>, AppError> {
    store::update(&state.db, table, id, body)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", table.label())))
}

async fn delete_row(state: &AppState, table: Table, id: Uuid) -> Result<StatusCode, AppError> {
    if store::delete(&state.db, table, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("{} {id} not found", table.label())))
    }
}
