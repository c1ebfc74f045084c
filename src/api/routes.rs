//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assignees::{self, Assignee};
use crate::board::TaskStatus;
use crate::config::Config;
use crate::store::{create_board_store, BoardStore};

use super::columns;
use super::tasks;
use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// The board store backing all task/column operations
    pub store: Box<dyn BoardStore>,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = create_board_store(config.store, config.data_dir.clone()).await?;
    if !store.is_persistent() {
        tracing::warn!("Using in-memory store; board data will not survive restarts");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(get_stats))
        .route("/api/assignees", get(list_assignees))
        .nest("/api/columns", columns::routes())
        .nest("/api/tasks", tasks::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_persistent: state.store.is_persistent(),
    })
}

/// Get board statistics.
async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, (axum::http::StatusCode, String)> {
    let columns = state
        .store
        .list_columns()
        .await
        .map_err(super::error_response)?;
    let tasks = state.store.list_tasks().await.map_err(super::error_response)?;

    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

    Ok(Json(StatsResponse {
        columns: columns.len(),
        total_tasks: tasks.len(),
        todo: count(TaskStatus::Todo),
        in_progress: count(TaskStatus::InProgress),
        review: count(TaskStatus::Review),
        done: count(TaskStatus::Done),
    }))
}

/// List the static assignee directory.
async fn list_assignees() -> Json<Vec<Assignee>> {
    Json(assignees::all())
}
