//! In-memory board store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::board::engine;
use crate::board::ordering::Positioned;
use crate::board::{BoardError, Column, NewTask, Task, TaskPatch};

use super::BoardStore;

#[derive(Default)]
struct BoardData {
    columns: HashMap<Uuid, Column>,
    tasks: HashMap<Uuid, Task>,
}

impl BoardData {
    /// Tasks of one column as (id, order) pairs, sorted by order.
    fn positioned_tasks(&self, column_id: Uuid) -> Vec<Positioned> {
        let mut out: Vec<Positioned> = self
            .tasks
            .values()
            .filter(|t| t.column_id == column_id)
            .map(|t| Positioned::new(t.id, t.order))
            .collect();
        out.sort_by_key(|p| p.order);
        out
    }

    fn positioned_columns(&self) -> Vec<Positioned> {
        let mut out: Vec<Positioned> = self
            .columns
            .values()
            .map(|c| Positioned::new(c.id, c.order))
            .collect();
        out.sort_by_key(|p| p.order);
        out
    }

    fn apply_task_orders(&mut self, updates: &[(Uuid, i64)], column_id: Uuid) {
        let now = Utc::now();
        for (id, order) in updates {
            if let Some(task) = self.tasks.get_mut(id) {
                task.order = *order;
                task.column_id = column_id;
                task.updated_at = now;
            }
        }
    }
}

/// Board state behind a single lock, so a cross-column move mutates both
/// columns under one write guard and readers never see a half-applied plan.
#[derive(Clone, Default)]
pub struct InMemoryBoardStore {
    inner: Arc<RwLock<BoardData>>,
}

impl InMemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_columns(&self) -> Result<Vec<Column>, BoardError> {
        let data = self.inner.read().await;
        let mut columns: Vec<Column> = data.columns.values().cloned().collect();
        columns.sort_by_key(|c| c.order);
        Ok(columns)
    }

    async fn get_column(&self, id: Uuid) -> Result<Option<Column>, BoardError> {
        Ok(self.inner.read().await.columns.get(&id).cloned())
    }

    async fn create_column(&self, title: &str) -> Result<Column, BoardError> {
        let mut data = self.inner.write().await;
        let order = data.columns.values().map(|c| c.order).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let column = Column {
            id: Uuid::new_v4(),
            title: title.to_string(),
            order,
            created_at: now,
            updated_at: now,
        };
        data.columns.insert(column.id, column.clone());
        Ok(column)
    }

    async fn update_column(&self, id: Uuid, title: &str) -> Result<Column, BoardError> {
        let mut data = self.inner.write().await;
        let column = data
            .columns
            .get_mut(&id)
            .ok_or_else(|| BoardError::column_not_found(id))?;
        column.title = title.to_string();
        column.updated_at = Utc::now();
        Ok(column.clone())
    }

    async fn delete_column(&self, id: Uuid) -> Result<bool, BoardError> {
        let mut data = self.inner.write().await;
        let plan = engine::plan_removal(&data.positioned_columns(), id);
        if data.columns.remove(&id).is_none() {
            return Ok(false);
        }
        data.tasks.retain(|_, t| t.column_id != id);
        let now = Utc::now();
        for (column_id, order) in plan {
            if let Some(column) = data.columns.get_mut(&column_id) {
                column.order = order;
                column.updated_at = now;
            }
        }
        Ok(true)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, BoardError> {
        let data = self.inner.read().await;
        let mut tasks: Vec<Task> = data.tasks.values().cloned().collect();
        tasks.sort_by_key(|t| (t.column_id, t.order));
        Ok(tasks)
    }

    async fn tasks_in_column(&self, column_id: Uuid) -> Result<Vec<Task>, BoardError> {
        let data = self.inner.read().await;
        let mut tasks: Vec<Task> = data
            .tasks
            .values()
            .filter(|t| t.column_id == column_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.order);
        Ok(tasks)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, BoardError> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn create_task(&self, new: NewTask) -> Result<Task, BoardError> {
        let mut data = self.inner.write().await;
        if !data.columns.contains_key(&new.column_id) {
            return Err(BoardError::column_not_found(new.column_id));
        }
        let order = data
            .tasks
            .values()
            .filter(|t| t.column_id == new.column_id)
            .map(|t| t.order)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            status: new.status,
            column_id: new.column_id,
            assignee_id: new.assignee_id,
            order,
            created_at: now,
            updated_at: now,
        };
        data.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task, BoardError> {
        let mut data = self.inner.write().await;
        let task = data
            .tasks
            .get_mut(&id)
            .ok_or_else(|| BoardError::task_not_found(id))?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = Some(assignee_id);
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, BoardError> {
        let mut data = self.inner.write().await;
        let Some(task) = data.tasks.get(&id).cloned() else {
            return Ok(false);
        };
        let plan = engine::plan_removal(&data.positioned_tasks(task.column_id), id);
        data.tasks.remove(&id);
        data.apply_task_orders(&plan, task.column_id);
        Ok(true)
    }

    async fn move_task(
        &self,
        id: Uuid,
        target_column_id: Uuid,
        target_index: usize,
    ) -> Result<Task, BoardError> {
        let mut data = self.inner.write().await;
        let task = data
            .tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| BoardError::task_not_found(id))?;
        if !data.columns.contains_key(&target_column_id) {
            return Err(BoardError::column_not_found(target_column_id));
        }

        let source = data.positioned_tasks(task.column_id);
        let target = if task.column_id == target_column_id {
            source.clone()
        } else {
            data.positioned_tasks(target_column_id)
        };
        let plan = engine::plan_move(
            id,
            task.column_id,
            &source,
            target_column_id,
            &target,
            target_index,
        )?;

        let now = Utc::now();
        for update in &plan {
            if let Some(t) = data.tasks.get_mut(&update.task_id) {
                t.order = update.order;
                t.column_id = update.column_id;
                t.updated_at = now;
            }
        }
        Ok(data.tasks[&id].clone())
    }

    async fn reorder_tasks(&self, column_id: Uuid, ordered: &[Uuid]) -> Result<(), BoardError> {
        let mut data = self.inner.write().await;
        if !data.columns.contains_key(&column_id) {
            return Err(BoardError::column_not_found(column_id));
        }
        let plan = engine::plan_reorder(&data.positioned_tasks(column_id), ordered)?;
        data.apply_task_orders(&plan, column_id);
        Ok(())
    }
}
