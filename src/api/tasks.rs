//! Task management API endpoints.
//!
//! Creation appends to the target column; edits never touch a task's
//! position. Repositioning goes through `POST /api/tasks/:id/move`, which
//! carries the drop target in display terms (column + 0-based index).

use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::{BoardError, Column, NewTask, Task, TaskPatch, TaskStatus};

use super::error_response;
use super::routes::AppState;

/// Create task routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks))
        .route("/", post(create_task))
        .route(
            "/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/:id/move", post(move_task))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    pub column_id: Uuid,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub target_column_id: Uuid,
    /// 0-based insertion position in the destination column's display order.
    pub target_index: i64,
}

#[derive(Debug, Serialize)]
pub struct TaskWithColumn {
    #[serde(flatten)]
    pub task: Task,
    pub column: Option<Column>,
}

fn validate_title(title: &str) -> Result<(), (StatusCode, String)> {
    if title.trim().is_empty() {
        return Err(error_response(BoardError::Validation(
            "title cannot be empty".to_string(),
        )));
    }
    Ok(())
}

/// GET /api/tasks - List all tasks, ordered by column and position.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let tasks = state.store.list_tasks().await.map_err(error_response)?;
    Ok(Json(tasks))
}

/// POST /api/tasks - Create a task at the end of its column.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    validate_title(&req.title)?;
    let task = state
        .store
        .create_task(NewTask {
            title: req.title.trim().to_string(),
            description: req.description,
            status: req.status,
            column_id: req.column_id,
            assignee_id: req.assignee_id,
        })
        .await
        .map_err(error_response)?;
    tracing::info!(
        "Created task {} in column {} at order {}",
        task.id,
        task.column_id,
        task.order
    );
    Ok(Json(task))
}

/// GET /api/tasks/:id - Get a task together with its column.
async fn get_task(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<TaskWithColumn>, (StatusCode, String)> {
    let task = state
        .store
        .get_task(id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(BoardError::task_not_found(id)))?;
    let column = state
        .store
        .get_column(task.column_id)
        .await
        .map_err(error_response)?;
    Ok(Json(TaskWithColumn { task, column }))
}

/// PATCH /api/tasks/:id - Edit task fields (never order/column).
async fn update_task(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, (StatusCode, String)> {
    if let Some(ref title) = patch.title {
        validate_title(title)?;
    }
    let task = state
        .store
        .update_task(id, patch)
        .await
        .map_err(error_response)?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id - Delete a task, closing the gap in its column.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let deleted = state.store.delete_task(id).await.map_err(error_response)?;
    if !deleted {
        return Err(error_response(BoardError::task_not_found(id)));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/tasks/:id/move - Move a task to a column/index.
async fn move_task(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    if req.target_index < 0 {
        return Err(error_response(BoardError::Validation(format!(
            "target_index must be non-negative, got {}",
            req.target_index
        ))));
    }
    let task = state
        .store
        .move_task(id, req.target_column_id, req.target_index as usize)
        .await
        .map_err(error_response)?;
    tracing::info!(
        "Moved task {} to column {} order {}",
        task.id,
        task.column_id,
        task.order
    );
    Ok(Json(task))
}
