//! HTTP API for the task board.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/stats` - Board statistics
//! - `GET /api/assignees` - Static assignee directory
//! - `GET /api/columns` - List columns with their tasks
//! - `POST /api/columns` - Create a column
//! - `GET /api/columns/{id}` - Get a column with its tasks
//! - `PATCH /api/columns/{id}` - Rename a column
//! - `DELETE /api/columns/{id}` - Delete a column (cascades to tasks)
//! - `POST /api/columns/{id}/reorder` - Reorder the tasks of a column
//! - `GET /api/tasks` - List all tasks
//! - `POST /api/tasks` - Create a task
//! - `GET /api/tasks/{id}` - Get a task with its column
//! - `PATCH /api/tasks/{id}` - Edit task fields
//! - `DELETE /api/tasks/{id}` - Delete a task
//! - `POST /api/tasks/{id}/move` - Move a task to a column/index

mod columns;
mod routes;
mod tasks;
mod types;

pub use routes::serve;
pub use types::*;

use axum::http::StatusCode;

use crate::board::BoardError;

/// Map a board error onto an HTTP status and message. Storage failures are
/// logged server-side and surfaced as a generic message.
pub(crate) fn error_response(err: BoardError) -> (StatusCode, String) {
    match err {
        BoardError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        BoardError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        BoardError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        BoardError::Transaction(msg) => {
            tracing::error!("storage failure: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage failure".to_string(),
            )
        }
    }
}
