//! Folio Router
//!
//! Swaps view fragments into the persistent shell:
//! 1. load the fragment for the requested view
//! 2. render it (or a structured error block) into the shell
//! 3. push a history record for user navigations
//! 4. reset the shell scroll offset
//! 5. notify subscribers that the view changed
//!
//! Requests are numbered; only the most recent request may write to the
//! shell, whatever order the fetches resolve in.

mod bus;
mod error;
mod render;
mod router;
mod shell;
mod state;

pub use bus::{FnSubscriber, NavigationBus, NavigationEvent, NavigationSubscriber};
pub use error::{RouterError, ShellError};
pub use render::{error_block, escape_html, Locale};
pub use router::{NavigationOutcome, RouterOptions, ViewRouter};
pub use shell::{
    EventKind, HeadlessShell, ListenerId, ListenerRegistry, SectionBox, Shell, ShellContext,
    ShellEvent,
};
pub use state::{NavigationKind, NavigationState, RenderOutcome};

pub use folio_fragments::ViewName;

pub type Result<T> = std::result::Result<T, RouterError>;
