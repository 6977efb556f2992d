//! Subscriber error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubscriberError {
    #[error("Storage error: {0}")]
    Storage(#[from] folio_storage::StorageError),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Sidebar markup has no {0} element")]
    MissingElement(&'static str),
}
