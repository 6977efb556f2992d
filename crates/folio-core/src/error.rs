//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] folio_storage::StorageError),

    #[error("Transport error: {0}")]
    Transport(#[from] folio_fragments::TransportError),

    #[error("Router error: {0}")]
    Router(#[from] folio_router::RouterError),

    #[error("Subscriber error: {0}")]
    Subscriber(#[from] folio_subscribers::SubscriberError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
