//! Navigation state
//!
//! ```text
//! Initial (replace, no push)
//!   ↓ navigate
//! Push ──back/forward──▶ Pop
//! ```
//!
//! Every completed render, successful or not, moves `current_view` to the
//! view that was attempted.

use folio_fragments::ViewName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// View whose content (or error block) the shell shows
    pub current_view: ViewName,
    /// Records in the browser history stack after the last render
    pub history_depth: usize,
}

impl NavigationState {
    pub fn new(default_view: ViewName) -> Self {
        Self {
            current_view: default_view,
            history_depth: 1,
        }
    }
}

/// What started a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationKind {
    /// First render at startup
    Initial,
    /// Link click or programmatic navigation
    Push,
    /// Browser back/forward
    Pop,
}

impl NavigationKind {
    /// Whether the navigation creates a history record
    pub fn pushes_history(&self) -> bool {
        matches!(self, NavigationKind::Push)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationKind::Initial => "initial",
            NavigationKind::Push => "push",
            NavigationKind::Pop => "pop",
        }
    }
}

impl std::fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What ended up in the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Fragment markup
    Loaded,
    /// Not-found presentation
    NotFound,
    /// Network-error presentation
    NetworkError,
}

impl RenderOutcome {
    pub fn is_error(&self) -> bool {
        !matches!(self, RenderOutcome::Loaded)
    }

    /// Modifier class of the error block, if any
    pub fn css_modifier(&self) -> Option<&'static str> {
        match self {
            RenderOutcome::Loaded => None,
            RenderOutcome::NotFound => Some("error-container--not-found"),
            RenderOutcome::NetworkError => Some("error-container--network-error"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderOutcome::Loaded => "loaded",
            RenderOutcome::NotFound => "not_found",
            RenderOutcome::NetworkError => "network_error",
        }
    }
}

impl std::fmt::Display for RenderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RenderOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loaded" => Ok(RenderOutcome::Loaded),
            "not_found" => Ok(RenderOutcome::NotFound),
            "network_error" => Ok(RenderOutcome::NetworkError),
            _ => Err(format!("Unknown render outcome: {}", s)),
        }
    }
}
