//! Folio Storage Layer
//!
//! SQLite-backed key/value settings for preferences that outlive a page
//! load (theme choice, locale). Fragments and navigation state are never
//! stored here.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
