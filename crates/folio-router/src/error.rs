//! Router error types

use folio_fragments::ViewName;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("Fragment of {size} bytes exceeds the shell limit of {limit} bytes")]
    ContentTooLarge { size: usize, limit: usize },

    #[error("Shell element is detached from the document")]
    Detached,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("No link to view {0} in the shell or the persistent navigation")]
    UnlinkedView(ViewName),
}
