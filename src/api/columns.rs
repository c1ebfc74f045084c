//! Column management API endpoints.
//!
//! Columns are returned with their tasks, both in display order, so a client
//! can render the whole board from one `GET /api/columns`.

use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::{BoardError, Column, Task};

use super::error_response;
use super::routes::AppState;

/// Create column routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_columns))
        .route("/", post(create_column))
        .route(
            "/:id",
            get(get_column).patch(update_column).delete(delete_column),
        )
        .route("/:id/reorder", post(reorder_tasks))
}

#[derive(Debug, Deserialize)]
pub struct CreateColumnRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateColumnRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderTasksRequest {
    /// The column's task ids in their new display order. Must be a full
    /// permutation of the column's current membership.
    pub task_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

fn validate_title(title: &str) -> Result<(), (StatusCode, String)> {
    if title.trim().is_empty() {
        return Err(error_response(BoardError::Validation(
            "title cannot be empty".to_string(),
        )));
    }
    Ok(())
}

async fn with_tasks(
    state: &AppState,
    column: Column,
) -> Result<ColumnWithTasks, (StatusCode, String)> {
    let tasks = state
        .store
        .tasks_in_column(column.id)
        .await
        .map_err(error_response)?;
    Ok(ColumnWithTasks { column, tasks })
}

/// GET /api/columns - List all columns with their tasks.
async fn list_columns(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ColumnWithTasks>>, (StatusCode, String)> {
    let columns = state.store.list_columns().await.map_err(error_response)?;
    let mut out = Vec::with_capacity(columns.len());
    for column in columns {
        out.push(with_tasks(&state, column).await?);
    }
    Ok(Json(out))
}

/// POST /api/columns - Create a column at the end of the board.
async fn create_column(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateColumnRequest>,
) -> Result<Json<Column>, (StatusCode, String)> {
    validate_title(&req.title)?;
    let column = state
        .store
        .create_column(req.title.trim())
        .await
        .map_err(error_response)?;
    tracing::info!("Created column: {} ({})", column.title, column.id);
    Ok(Json(column))
}

/// GET /api/columns/:id - Get a column with its tasks.
async fn get_column(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<ColumnWithTasks>, (StatusCode, String)> {
    let column = state
        .store
        .get_column(id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(BoardError::column_not_found(id)))?;
    Ok(Json(with_tasks(&state, column).await?))
}

/// PATCH /api/columns/:id - Rename a column.
async fn update_column(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<UpdateColumnRequest>,
) -> Result<Json<Column>, (StatusCode, String)> {
    validate_title(&req.title)?;
    let column = state
        .store
        .update_column(id, req.title.trim())
        .await
        .map_err(error_response)?;
    Ok(Json(column))
}

/// DELETE /api/columns/:id - Delete a column and its tasks.
async fn delete_column(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let deleted = state.store.delete_column(id).await.map_err(error_response)?;
    if !deleted {
        return Err(error_response(BoardError::column_not_found(id)));
    }
    tracing::info!("Deleted column {}", id);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/columns/:id/reorder - Apply a full permutation of the column.
async fn reorder_tasks(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<ReorderTasksRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .store
        .reorder_tasks(id, &req.task_ids)
        .await
        .map_err(error_response)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
