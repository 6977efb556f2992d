//! History error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Stale history entry: {0}")]
    StaleEntry(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
