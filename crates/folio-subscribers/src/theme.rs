//! Dark/light theme toggle
//!
//! The saved choice wins over the system preference. The toggle button sits
//! outside the shell, so its click listener is attached once and kept.

use folio_router::{EventKind, ListenerId, NavigationEvent, NavigationSubscriber, ShellContext};
use folio_storage::Database;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::SubscriberError;
use crate::Result;

/// Same key the site scripts store the choice under
pub const THEME_SETTING_KEY: &str = "fds-theme";
pub const THEME_BUTTON_ID: &str = "theme-toggle-button";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Value of the document's `data-theme` attribute; light removes it
    pub fn data_theme(&self) -> Option<&'static str> {
        match self {
            Theme::Light => None,
            Theme::Dark => Some("dark"),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = SubscriberError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(SubscriberError::UnknownTheme(s.to_string())),
        }
    }
}

struct ThemeInner {
    db: Database,
    system_prefers_dark: bool,
    applied: Theme,
    listener: Option<ListenerId>,
}

/// Cloning shares state, so a host can keep a handle after registering
#[derive(Clone)]
pub struct ThemeToggle {
    inner: Arc<Mutex<ThemeInner>>,
}

impl ThemeToggle {
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ThemeInner {
                db,
                system_prefers_dark: false,
                applied: Theme::Light,
                listener: None,
            })),
        }
    }

    pub fn with_system_preference(self, prefers_dark: bool) -> Self {
        self.inner.lock().system_prefers_dark = prefers_dark;
        self
    }

    /// Theme currently applied to the document
    pub fn theme(&self) -> Theme {
        self.inner.lock().applied
    }

    pub fn is_bound(&self) -> bool {
        self.inner.lock().listener.is_some()
    }

    /// Saved choice, or the system preference when nothing is saved
    pub fn preferred(&self) -> Result<Theme> {
        let inner = self.inner.lock();
        Self::preferred_for(&inner)
    }

    fn preferred_for(inner: &ThemeInner) -> Result<Theme> {
        match inner.db.get_setting(THEME_SETTING_KEY)? {
            Some(saved) => Ok(saved.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring saved theme");
                Theme::Light
            })),
            None if inner.system_prefers_dark => Ok(Theme::Dark),
            None => Ok(Theme::Light),
        }
    }

    /// Re-apply the preferred theme
    pub fn apply(&self) -> Theme {
        let mut inner = self.inner.lock();
        let theme = Self::preferred_for(&inner).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read theme preference");
            if inner.system_prefers_dark {
                Theme::Dark
            } else {
                Theme::Light
            }
        });
        inner.applied = theme;
        theme
    }

    /// Flip the theme and save the choice
    pub fn toggle(&self) -> Result<Theme> {
        let mut inner = self.inner.lock();
        let theme = inner.applied.toggled();
        inner.applied = theme;
        inner.db.set_setting(THEME_SETTING_KEY, theme.as_str())?;

        tracing::info!(theme = %theme, "Theme toggled");
        Ok(theme)
    }
}

impl NavigationSubscriber for ThemeToggle {
    fn name(&self) -> &str {
        "theme"
    }

    fn on_view_loaded(&mut self, _event: &NavigationEvent, shell: &mut ShellContext<'_>) {
        self.apply();

        if !shell.has_element(THEME_BUTTON_ID) {
            return;
        }

        let mut inner = self.inner.lock();
        if let Some(id) = inner.listener {
            if shell.is_attached(id) {
                return;
            }
        }

        let toggle = self.clone();
        let id = shell.add_listener(EventKind::Click(THEME_BUTTON_ID.to_string()), move |_| {
            if let Err(e) = toggle.toggle() {
                tracing::error!(error = %e, "Failed to save theme");
            }
        });
        inner.listener = Some(id);
    }

    fn on_teardown(&mut self, shell: &mut ShellContext<'_>) {
        if let Some(id) = self.inner.lock().listener.take() {
            shell.remove_listener(id);
        }
    }
}
