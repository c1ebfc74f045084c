//! Task board domain model.
//!
//! A board is a set of ordered columns, each owning an ordered list of tasks.
//! Both namespaces carry the same dense-ordering invariant: within a scope,
//! `order` values are exactly `1..=count`, no gaps, no duplicates. The
//! [`ordering`] module holds the list primitives and [`engine`] computes the
//! update plans that the store backends apply transactionally.

pub mod engine;
pub mod ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by board operations.
///
/// Every failure aborts the whole operation; nothing is recovered silently
/// and nothing is retried (a retry could double-apply order shifts).
#[derive(Debug, Error)]
pub enum BoardError {
    /// A referenced task or column does not exist. No partial mutation.
    #[error("{0}")]
    NotFound(String),

    /// Malformed input, rejected before any store mutation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The client's view of a column was stale (e.g. a reorder permutation
    /// that no longer matches the column's membership).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The underlying store failed mid-operation. The transaction is rolled
    /// back in full; state is exactly as before the call.
    #[error("storage failure: {0}")]
    Transaction(String),
}

impl BoardError {
    pub fn task_not_found(id: Uuid) -> Self {
        Self::NotFound(format!("Task {} not found", id))
    }

    pub fn column_not_found(id: Uuid) -> Self {
        Self::NotFound(format!("Column {} not found", id))
    }
}

/// Task workflow status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// Parse a stored status string, defaulting unknown values to `Todo`.
    pub fn parse(s: &str) -> Self {
        match s {
            "todo" => TaskStatus::Todo,
            "in_progress" => TaskStatus::InProgress,
            "review" => TaskStatus::Review,
            "done" => TaskStatus::Done,
            _ => TaskStatus::Todo,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A board column. Owns zero or more tasks; `order` is dense across the
/// single global column namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: Uuid,
    pub title: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task. Belongs to exactly one column at any committed state; `order` is
/// dense within the owning column. Only the repositioning paths may mutate
/// `order`/`column_id` — field edits never touch them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub column_id: Uuid,
    pub assignee_id: Option<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a task. `order` is assigned by the store
/// (`max_in_column + 1`), never by the caller.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub column_id: Uuid,
    pub assignee_id: Option<String>,
}

/// Partial task update. `None` leaves a field unchanged. Deliberately has no
/// `order`/`column_id` — repositioning goes through `move_task`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<String>,
}
