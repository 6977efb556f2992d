//! Folio Core
//!
//! Wires the navigation subsystem into one owned [`Site`]: configuration,
//! settings storage, the router and the bundled subscribers.

mod config;
mod error;
mod site;

pub use config::Config;
pub use error::CoreError;
pub use site::Site;

pub use folio_fragments::{FragmentLoader, FragmentResult, ViewName};
pub use folio_history::{BrowserHistory, MemoryHistory};
pub use folio_router::{
    HeadlessShell, Locale, NavigationEvent, NavigationKind, NavigationOutcome, NavigationState,
    RenderOutcome, RouterError, Shell, ViewRouter,
};
pub use folio_storage::Database;
pub use folio_subscribers::{NavBar, Scrollspy, SidebarSnapshot, SidebarState, Theme, ThemeToggle};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging on stderr, leaving stdout to the host
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
