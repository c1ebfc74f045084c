//! SQLite-based board store.
//!
//! One connection behind a mutex; every order-mutating operation runs its
//! read-plan-write cycle inside a single `rusqlite` transaction, so the
//! dense-ordering invariant either advances atomically or not at all.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::board::engine::{self, OrderUpdate};
use crate::board::ordering::Positioned;
use crate::board::{BoardError, Column, NewTask, Task, TaskPatch, TaskStatus};

use super::BoardStore;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS columns (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    "order" INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_columns_order ON columns("order");

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'todo',
    column_id TEXT NOT NULL,
    assignee_id TEXT,
    "order" INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (column_id) REFERENCES columns(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tasks_column_order ON tasks(column_id, "order");
"#;

pub struct SqliteBoardStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBoardStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, BoardError> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| BoardError::Transaction(format!("Failed to create data dir: {}", e)))?;
        let db_path = data_dir.join("taskboard.db");

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| {
                BoardError::Transaction(format!("Failed to open SQLite database: {}", e))
            })?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| BoardError::Transaction(format!("Failed to run schema: {}", e)))?;
            Self::run_migrations(&conn)?;
            Ok::<_, BoardError>(conn)
        })
        .await
        .map_err(join_err)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Schema changes for databases created before a column existed.
    /// CREATE TABLE IF NOT EXISTS does not add columns to existing tables.
    fn run_migrations(conn: &Connection) -> Result<(), BoardError> {
        let has_assignee: bool = conn
            .prepare("SELECT 1 FROM pragma_table_info('tasks') WHERE name = 'assignee_id'")
            .map_err(db_err)?
            .exists([])
            .map_err(db_err)?;

        if !has_assignee {
            tracing::info!("Running migration: adding 'assignee_id' column to tasks table");
            conn.execute("ALTER TABLE tasks ADD COLUMN assignee_id TEXT", [])
                .map_err(db_err)?;
        }

        Ok(())
    }
}

fn db_err(e: rusqlite::Error) -> BoardError {
    BoardError::Transaction(e.to_string())
}

fn join_err(e: tokio::task::JoinError) -> BoardError {
    BoardError::Transaction(format!("Task join error: {}", e))
}

fn parse_ts(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

const TASK_COLUMNS: &str =
    r#"id, title, description, status, column_id, assignee_id, "order", created_at, updated_at"#;

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let status: String = row.get(3)?;
    let column_id: String = row.get(4)?;
    Ok(Task {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        title: row.get(1)?,
        description: row.get(2)?,
        status: TaskStatus::parse(&status),
        column_id: Uuid::parse_str(&column_id).unwrap_or_default(),
        assignee_id: row.get(5)?,
        order: row.get(6)?,
        created_at: parse_ts(row.get(7)?),
        updated_at: parse_ts(row.get(8)?),
    })
}

fn column_from_row(row: &Row) -> rusqlite::Result<Column> {
    let id: String = row.get(0)?;
    Ok(Column {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        title: row.get(1)?,
        order: row.get(2)?,
        created_at: parse_ts(row.get(3)?),
        updated_at: parse_ts(row.get(4)?),
    })
}

fn fetch_task(conn: &Connection, id: Uuid) -> Result<Option<Task>, BoardError> {
    conn.query_row(
        &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
        params![id.to_string()],
        task_from_row,
    )
    .optional()
    .map_err(db_err)
}

fn fetch_column(conn: &Connection, id: Uuid) -> Result<Option<Column>, BoardError> {
    conn.query_row(
        r#"SELECT id, title, "order", created_at, updated_at FROM columns WHERE id = ?1"#,
        params![id.to_string()],
        column_from_row,
    )
    .optional()
    .map_err(db_err)
}

/// (id, order) pairs of one column's tasks, sorted by order.
fn positioned_tasks(conn: &Connection, column_id: Uuid) -> Result<Vec<Positioned>, BoardError> {
    let mut stmt = conn
        .prepare(r#"SELECT id, "order" FROM tasks WHERE column_id = ?1 ORDER BY "order""#)
        .map_err(db_err)?;
    let rows = stmt
        .query_map(params![column_id.to_string()], |row| {
            let id: String = row.get(0)?;
            let order: i64 = row.get(1)?;
            Ok(Positioned::new(Uuid::parse_str(&id).unwrap_or_default(), order))
        })
        .map_err(db_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_err)?;
    Ok(rows)
}

fn positioned_columns(conn: &Connection) -> Result<Vec<Positioned>, BoardError> {
    let mut stmt = conn
        .prepare(r#"SELECT id, "order" FROM columns ORDER BY "order""#)
        .map_err(db_err)?;
    let rows = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let order: i64 = row.get(1)?;
            Ok(Positioned::new(Uuid::parse_str(&id).unwrap_or_default(), order))
        })
        .map_err(db_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_err)?;
    Ok(rows)
}

/// Apply a move plan: each affected task gets its new column and order.
fn apply_move_plan(conn: &Connection, plan: &[OrderUpdate], now: &str) -> Result<(), BoardError> {
    for update in plan {
        conn.execute(
            r#"UPDATE tasks SET column_id = ?1, "order" = ?2, updated_at = ?3 WHERE id = ?4"#,
            params![
                update.column_id.to_string(),
                update.order,
                now,
                update.task_id.to_string()
            ],
        )
        .map_err(db_err)?;
    }
    Ok(())
}

/// Apply in-column order updates (reorder and gap-closing shifts).
fn apply_task_orders(conn: &Connection, plan: &[(Uuid, i64)], now: &str) -> Result<(), BoardError> {
    for (id, order) in plan {
        conn.execute(
            r#"UPDATE tasks SET "order" = ?1, updated_at = ?2 WHERE id = ?3"#,
            params![order, now, id.to_string()],
        )
        .map_err(db_err)?;
    }
    Ok(())
}

#[async_trait]
impl BoardStore for SqliteBoardStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_columns(&self) -> Result<Vec<Column>, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(
                    r#"SELECT id, title, "order", created_at, updated_at
                       FROM columns ORDER BY "order""#,
                )
                .map_err(db_err)?;
            let columns = stmt
                .query_map([], column_from_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(columns)
        })
        .await
        .map_err(join_err)?
    }

    async fn get_column(&self, id: Uuid) -> Result<Option<Column>, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            fetch_column(&conn, id)
        })
        .await
        .map_err(join_err)?
    }

    async fn create_column(&self, title: &str) -> Result<Column, BoardError> {
        let conn = self.conn.clone();
        let title = title.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction().map_err(db_err)?;
            let order: i64 = tx
                .query_row(r#"SELECT COALESCE(MAX("order"), 0) FROM columns"#, [], |row| {
                    row.get(0)
                })
                .map_err(db_err)?;
            let now = Utc::now();
            let column = Column {
                id: Uuid::new_v4(),
                title,
                order: order + 1,
                created_at: now,
                updated_at: now,
            };
            tx.execute(
                r#"INSERT INTO columns (id, title, "order", created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    column.id.to_string(),
                    column.title,
                    column.order,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .map_err(db_err)?;
            tx.commit().map_err(db_err)?;
            Ok(column)
        })
        .await
        .map_err(join_err)?
    }

    async fn update_column(&self, id: Uuid, title: &str) -> Result<Column, BoardError> {
        let conn = self.conn.clone();
        let title = title.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let changed = conn
                .execute(
                    "UPDATE columns SET title = ?1, updated_at = ?2 WHERE id = ?3",
                    params![title, Utc::now().to_rfc3339(), id.to_string()],
                )
                .map_err(db_err)?;
            if changed == 0 {
                return Err(BoardError::column_not_found(id));
            }
            fetch_column(&conn, id)?.ok_or_else(|| BoardError::column_not_found(id))
        })
        .await
        .map_err(join_err)?
    }

    async fn delete_column(&self, id: Uuid) -> Result<bool, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction().map_err(db_err)?;
            let plan = engine::plan_removal(&positioned_columns(&tx)?, id);
            // ON DELETE CASCADE removes the member tasks with the column.
            let deleted = tx
                .execute("DELETE FROM columns WHERE id = ?1", params![id.to_string()])
                .map_err(db_err)?;
            if deleted == 0 {
                return Ok(false);
            }
            let now = Utc::now().to_rfc3339();
            for (column_id, order) in plan {
                tx.execute(
                    r#"UPDATE columns SET "order" = ?1, updated_at = ?2 WHERE id = ?3"#,
                    params![order, now, column_id.to_string()],
                )
                .map_err(db_err)?;
            }
            tx.commit().map_err(db_err)?;
            Ok(true)
        })
        .await
        .map_err(join_err)?
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&format!(
                    r#"SELECT {} FROM tasks ORDER BY column_id, "order""#,
                    TASK_COLUMNS
                ))
                .map_err(db_err)?;
            let tasks = stmt
                .query_map([], task_from_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(tasks)
        })
        .await
        .map_err(join_err)?
    }

    async fn tasks_in_column(&self, column_id: Uuid) -> Result<Vec<Task>, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&format!(
                    r#"SELECT {} FROM tasks WHERE column_id = ?1 ORDER BY "order""#,
                    TASK_COLUMNS
                ))
                .map_err(db_err)?;
            let tasks = stmt
                .query_map(params![column_id.to_string()], task_from_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            Ok(tasks)
        })
        .await
        .map_err(join_err)?
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            fetch_task(&conn, id)
        })
        .await
        .map_err(join_err)?
    }

    async fn create_task(&self, new: NewTask) -> Result<Task, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction().map_err(db_err)?;
            if fetch_column(&tx, new.column_id)?.is_none() {
                return Err(BoardError::column_not_found(new.column_id));
            }
            let order: i64 = tx
                .query_row(
                    r#"SELECT COALESCE(MAX("order"), 0) FROM tasks WHERE column_id = ?1"#,
                    params![new.column_id.to_string()],
                    |row| row.get(0),
                )
                .map_err(db_err)?;
            let now = Utc::now();
            let task = Task {
                id: Uuid::new_v4(),
                title: new.title,
                description: new.description,
                status: new.status,
                column_id: new.column_id,
                assignee_id: new.assignee_id,
                order: order + 1,
                created_at: now,
                updated_at: now,
            };
            tx.execute(
                &format!(
                    "INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    TASK_COLUMNS
                ),
                params![
                    task.id.to_string(),
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.column_id.to_string(),
                    task.assignee_id,
                    task.order,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .map_err(db_err)?;
            tx.commit().map_err(db_err)?;
            Ok(task)
        })
        .await
        .map_err(join_err)?
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction().map_err(db_err)?;
            let mut task = fetch_task(&tx, id)?.ok_or_else(|| BoardError::task_not_found(id))?;
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
            tx.execute(
                "UPDATE tasks SET title = ?1, description = ?2, status = ?3, assignee_id = ?4,
                        updated_at = ?5
                 WHERE id = ?6",
                params![
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.assignee_id,
                    task.updated_at.to_rfc3339(),
                    id.to_string()
                ],
            )
            .map_err(db_err)?;
            tx.commit().map_err(db_err)?;
            Ok(task)
        })
        .await
        .map_err(join_err)?
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction().map_err(db_err)?;
            let Some(task) = fetch_task(&tx, id)? else {
                return Ok(false);
            };
            let plan = engine::plan_removal(&positioned_tasks(&tx, task.column_id)?, id);
            tx.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
                .map_err(db_err)?;
            apply_task_orders(&tx, &plan, &Utc::now().to_rfc3339())?;
            tx.commit().map_err(db_err)?;
            Ok(true)
        })
        .await
        .map_err(join_err)?
    }

    async fn move_task(
        &self,
        id: Uuid,
        target_column_id: Uuid,
        target_index: usize,
    ) -> Result<Task, BoardError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction().map_err(db_err)?;
            let task = fetch_task(&tx, id)?.ok_or_else(|| BoardError::task_not_found(id))?;
            if fetch_column(&tx, target_column_id)?.is_none() {
                return Err(BoardError::column_not_found(target_column_id));
            }

            let source = positioned_tasks(&tx, task.column_id)?;
            let target = if task.column_id == target_column_id {
                source.clone()
            } else {
                positioned_tasks(&tx, target_column_id)?
            };
            let plan = engine::plan_move(
                id,
                task.column_id,
                &source,
                target_column_id,
                &target,
                target_index,
            )?;
            apply_move_plan(&tx, &plan, &Utc::now().to_rfc3339())?;

            let moved = fetch_task(&tx, id)?.ok_or_else(|| BoardError::task_not_found(id))?;
            tx.commit().map_err(db_err)?;
            Ok(moved)
        })
        .await
        .map_err(join_err)?
    }

    async fn reorder_tasks(&self, column_id: Uuid, ordered: &[Uuid]) -> Result<(), BoardError> {
        let conn = self.conn.clone();
        let ordered = ordered.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction().map_err(db_err)?;
            if fetch_column(&tx, column_id)?.is_none() {
                return Err(BoardError::column_not_found(column_id));
            }
            let plan = engine::plan_reorder(&positioned_tasks(&tx, column_id)?, &ordered)?;
            apply_task_orders(&tx, &plan, &Utc::now().to_rfc3339())?;
            tx.commit().map_err(db_err)?;
            Ok(())
        })
        .await
        .map_err(join_err)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store(dir: &tempfile::TempDir) -> SqliteBoardStore {
        SqliteBoardStore::new(dir.path().to_path_buf())
            .await
            .expect("open store")
    }

    async fn add_task(store: &SqliteBoardStore, column_id: Uuid, title: &str) -> Task {
        store
            .create_task(NewTask {
                title: title.to_string(),
                description: None,
                status: TaskStatus::Todo,
                column_id,
                assignee_id: None,
            })
            .await
            .expect("create task")
    }

    async fn assert_dense(store: &SqliteBoardStore, column_id: Uuid) {
        let tasks = store.tasks_in_column(column_id).await.unwrap();
        let orders: Vec<i64> = tasks.iter().map(|t| t.order).collect();
        let expected: Vec<i64> = (1..=tasks.len() as i64).collect();
        assert_eq!(orders, expected);
    }

    #[tokio::test]
    async fn board_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let col = store.create_column("To Do").await.unwrap();
        let task = add_task(&store, col.id, "persisted").await;
        let (col_id, task_id) = (col.id, task.id);
        drop(store);

        let store = open_store(&dir).await;
        let col = store.get_column(col_id).await.unwrap().unwrap();
        assert_eq!(col.title, "To Do");
        let task = store.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.title, "persisted");
        assert_eq!(task.order, 1);
    }

    #[tokio::test]
    async fn cross_column_move_is_atomic_and_dense() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let col_a = store.create_column("A").await.unwrap();
        let col_b = store.create_column("B").await.unwrap();
        let t1 = add_task(&store, col_a.id, "T1").await;
        let t2 = add_task(&store, col_a.id, "T2").await;
        let t3 = add_task(&store, col_b.id, "T3").await;

        let moved = store.move_task(t1.id, col_b.id, 0).await.unwrap();
        assert_eq!(moved.column_id, col_b.id);
        assert_eq!(moved.order, 1);

        let a: Vec<Uuid> = store
            .tasks_in_column(col_a.id)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(a, vec![t2.id]);
        let b: Vec<Uuid> = store
            .tasks_in_column(col_b.id)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(b, vec![t1.id, t3.id]);
        assert_dense(&store, col_a.id).await;
        assert_dense(&store, col_b.id).await;
    }

    #[tokio::test]
    async fn delete_closes_gap_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let col = store.create_column("A").await.unwrap();
        let t1 = add_task(&store, col.id, "T1").await;
        let t2 = add_task(&store, col.id, "T2").await;
        let t3 = add_task(&store, col.id, "T3").await;

        assert!(store.delete_task(t2.id).await.unwrap());

        let tasks = store.tasks_in_column(col.id).await.unwrap();
        assert_eq!(
            tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![t1.id, t3.id]
        );
        assert_dense(&store, col.id).await;
    }

    #[tokio::test]
    async fn reorder_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let col = store.create_column("A").await.unwrap();
        let t1 = add_task(&store, col.id, "T1").await;
        let t2 = add_task(&store, col.id, "T2").await;
        let t3 = add_task(&store, col.id, "T3").await;

        store
            .reorder_tasks(col.id, &[t3.id, t1.id, t2.id])
            .await
            .unwrap();

        let ids: Vec<Uuid> = store
            .tasks_in_column(col.id)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![t3.id, t1.id, t2.id]);
    }

    #[tokio::test]
    async fn column_delete_cascades_and_reorders() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let c1 = store.create_column("A").await.unwrap();
        let c2 = store.create_column("B").await.unwrap();
        let c3 = store.create_column("C").await.unwrap();
        let doomed = add_task(&store, c2.id, "doomed").await;

        assert!(store.delete_column(c2.id).await.unwrap());

        assert!(store.get_task(doomed.id).await.unwrap().is_none());
        let columns = store.list_columns().await.unwrap();
        assert_eq!(
            columns.iter().map(|c| (c.id, c.order)).collect::<Vec<_>>(),
            vec![(c1.id, 1), (c3.id, 2)]
        );
    }

    #[tokio::test]
    async fn failed_move_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        let col = store.create_column("A").await.unwrap();
        let t1 = add_task(&store, col.id, "T1").await;
        add_task(&store, col.id, "T2").await;

        let err = store.move_task(t1.id, Uuid::new_v4(), 0).await.unwrap_err();
        assert!(matches!(err, BoardError::NotFound(_)));

        let tasks = store.tasks_in_column(col.id).await.unwrap();
        assert_eq!(tasks[0].id, t1.id);
        assert_dense(&store, col.id).await;
    }
}
