//! Folio Subscribers
//!
//! Page modules that depend on the current view and must re-bind after the
//! router swaps the shell content:
//! - scrollspy for in-page section navigation
//! - top nav bar marker while the shell is scrolled
//! - sidebar active state and mobile drawer
//! - dark/light theme toggle with a persisted preference

mod error;
mod navbar;
mod scrollspy;
mod sidebar;
mod theme;

pub use error::SubscriberError;
pub use navbar::NavBar;
pub use scrollspy::{resolve_active, NavLink, Scrollspy, DEFAULT_NAV_OFFSET};
pub use sidebar::{SidebarButton, SidebarSnapshot, SidebarState, DEFAULT_MOBILE_BREAKPOINT};
pub use theme::{Theme, ThemeToggle, THEME_BUTTON_ID, THEME_SETTING_KEY};

pub type Result<T> = std::result::Result<T, SubscriberError>;
