//! Seeds the board with starter columns and sample tasks.
//!
//! Run once against a fresh database: `cargo run --bin seed`.

use taskboard::board::{NewTask, TaskStatus};
use taskboard::config::Config;
use taskboard::store::create_board_store;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let store = create_board_store(config.store, config.data_dir.clone()).await?;
    if !store.is_persistent() {
        warn!("Seeding a non-persistent store; data is gone when this process exits");
    }

    info!("Seeding board...");

    let todo = store.create_column("To Do").await?;
    let in_progress = store.create_column("In Progress").await?;
    let done = store.create_column("Done").await?;
    info!("Created columns: To Do, In Progress, Done");

    let samples = [
        (
            "Design task board UI",
            "Create wireframes for the task board interface",
            todo.id,
            "1",
        ),
        (
            "Implement drag and drop",
            "Add drag and drop functionality for tasks between columns",
            in_progress.id,
            "2",
        ),
        (
            "Set up database schema",
            "Design and implement the database schema for tasks and columns",
            done.id,
            "3",
        ),
    ];

    for (title, description, column_id, assignee_id) in samples {
        let task = store
            .create_task(NewTask {
                title: title.to_string(),
                description: Some(description.to_string()),
                status: TaskStatus::Todo,
                column_id,
                assignee_id: Some(assignee_id.to_string()),
            })
            .await?;
        info!("Created task: {} ({})", task.title, task.id);
    }

    info!("Board seeded successfully");
    Ok(())
}
