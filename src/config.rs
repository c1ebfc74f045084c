//! Configuration management for the task board server.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `DATA_DIR` - Optional. Directory for persistent storage. Defaults to `./data`.
//! - `BOARD_STORE` - Optional. Store backend, `sqlite` or `memory`. Defaults to `sqlite`.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::BoardStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory holding the SQLite database
    pub data_dir: PathBuf,

    /// Which store backend to use
    pub store: BoardStoreType,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let store = std::env::var("BOARD_STORE")
            .map(|s| BoardStoreType::from_str(&s))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            data_dir,
            store,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(data_dir: PathBuf, store: BoardStoreType) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir,
            store,
        }
    }
}
