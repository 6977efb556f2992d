//! Folio History
//!
//! Keeps the browser history stack in step with the views that were
//! actually shown:
//! - every record carries a `{"view": ...}` state and a `#/<view>` locator
//! - the initial load replaces the current record instead of pushing
//! - pops with a missing or malformed state are ignored

mod browser;
mod controller;
mod entry;
mod error;
mod locator;

pub use browser::{BrowserHistory, MemoryHistory, PopEvent};
pub use controller::ViewHistoryController;
pub use entry::HistoryEntry;
pub use error::HistoryError;
pub use locator::Locator;

pub type Result<T> = std::result::Result<T, HistoryError>;
