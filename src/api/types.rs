//! API request and response types shared across resources.

use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether the configured store survives restarts.
    pub store_persistent: bool,
}

/// Board statistics response.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of columns on the board
    pub columns: usize,

    /// Total number of tasks across all columns
    pub total_tasks: usize,

    /// Task counts per workflow status
    pub todo: usize,
    pub in_progress: usize,
    pub review: usize,
    pub done: usize,
}
