//! Board storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for tests and dev)
//! - `sqlite`: SQLite database (persistent, the default)
//!
//! Every order-mutating operation re-reads the affected columns, computes its
//! update plan via [`crate::board::engine`], and applies the plan inside one
//! transactional scope — a `rusqlite` transaction for SQLite, a single write
//! guard for memory — so readers never observe duplicate or gapped order
//! values and a failure rolls back the whole operation.

mod memory;
mod sqlite;

pub use memory::InMemoryBoardStore;
pub use sqlite::SqliteBoardStore;

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::board::{BoardError, Column, NewTask, Task, TaskPatch};

/// Board store trait - implemented by all storage backends.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List all columns, ordered by their board position.
    async fn list_columns(&self) -> Result<Vec<Column>, BoardError>;

    /// Get a single column by ID.
    async fn get_column(&self, id: Uuid) -> Result<Option<Column>, BoardError>;

    /// Create a column at the end of the board (`order = max + 1`).
    async fn create_column(&self, title: &str) -> Result<Column, BoardError>;

    /// Rename a column. Never touches its order.
    async fn update_column(&self, id: Uuid, title: &str) -> Result<Column, BoardError>;

    /// Delete a column, cascading to its tasks and closing the gap in the
    /// column sequence. Returns `false` if the column did not exist.
    async fn delete_column(&self, id: Uuid) -> Result<bool, BoardError>;

    /// List all tasks, ordered by column and position.
    async fn list_tasks(&self) -> Result<Vec<Task>, BoardError>;

    /// List the tasks of one column, sorted by position.
    async fn tasks_in_column(&self, column_id: Uuid) -> Result<Vec<Task>, BoardError>;

    /// Get a single task by ID.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, BoardError>;

    /// Create a task at the end of its column (`order = max + 1`).
    async fn create_task(&self, new: NewTask) -> Result<Task, BoardError>;

    /// Update task fields. Never touches `order`/`column_id`.
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task, BoardError>;

    /// Delete a task, shifting later tasks in its column down by one in the
    /// same transaction. Returns `false` if the task did not exist.
    async fn delete_task(&self, id: Uuid) -> Result<bool, BoardError>;

    /// Move a task to `target_index` in `target_column_id` (same or different
    /// column), per the repositioning contract.
    async fn move_task(
        &self,
        id: Uuid,
        target_column_id: Uuid,
        target_index: usize,
    ) -> Result<Task, BoardError>;

    /// Apply a caller-supplied full permutation of one column's tasks.
    async fn reorder_tasks(&self, column_id: Uuid, ordered: &[Uuid]) -> Result<(), BoardError>;
}

/// Board store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl BoardStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a board store based on type and configuration.
pub async fn create_board_store(
    store_type: BoardStoreType,
    data_dir: PathBuf,
) -> Result<Box<dyn BoardStore>, BoardError> {
    match store_type {
        BoardStoreType::Memory => Ok(Box::new(InMemoryBoardStore::new())),
        BoardStoreType::Sqlite => {
            let store = SqliteBoardStore::new(data_dir).await?;
            Ok(Box::new(store))
        }
    }
}
