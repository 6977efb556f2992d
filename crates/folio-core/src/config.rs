//! Site configuration

use folio_fragments::ViewName;
use folio_router::{Locale, RouterOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory or http(s) URL fragments are resolved against
    pub fragment_root: String,
    /// Appended to a view name to form the fragment path
    pub fragment_extension: String,
    /// View shown at startup and linked from error blocks
    pub default_view: ViewName,
    pub fetch_timeout_ms: u64,
    pub locale: Locale,
    /// Header height subtracted from section tops by the scrollspy
    pub nav_offset: f64,
    /// SQLite file holding persisted preferences
    pub settings_path: PathBuf,
    pub mobile_breakpoint: f64,
    /// File with the persistent sidebar markup, if the site has one
    pub sidebar_path: Option<PathBuf>,
    pub system_prefers_dark: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            fragment_root: "pages/".to_string(),
            fragment_extension: folio_fragments::DEFAULT_EXTENSION.to_string(),
            default_view: ViewName::default(),
            fetch_timeout_ms: 6_000,
            locale: Locale::default(),
            nav_offset: folio_subscribers::DEFAULT_NAV_OFFSET,
            settings_path: data_dir.join("settings.db"),
            mobile_breakpoint: folio_subscribers::DEFAULT_MOBILE_BREAKPOINT,
            sidebar_path: None,
            system_prefers_dark: false,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("folio"))
            .unwrap_or_else(|| PathBuf::from(".folio"))
    }

    /// Read a TOML file; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fragment_root.trim().is_empty() {
            return Err(CoreError::Config("fragment_root is empty".to_string()));
        }
        if !self.default_view.is_safe() {
            return Err(CoreError::Config(format!(
                "default_view {:?} is not a valid view name",
                self.default_view.as_str()
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(CoreError::Config(
                "fetch_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            default_view: self.default_view.clone(),
            locale: self.locale,
            ..RouterOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("/tmp/folio"));
        assert_eq!(config.fragment_root, "pages/");
        assert_eq!(config.fragment_extension, ".html");
        assert_eq!(config.default_view, "home");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(6));
        assert_eq!(config.locale, Locale::Es);
        assert_eq!(config.nav_offset, 150.0);
        assert_eq!(config.mobile_breakpoint, 1024.0);
        assert_eq!(config.settings_path, PathBuf::from("/tmp/folio/settings.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            "fragment_root = \"https://docs.example.com/pages/\"\nlocale = \"en\"\nfetch_timeout_ms = 2500\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.fragment_root, "https://docs.example.com/pages/");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.fetch_timeout_ms, 2_500);
        assert_eq!(config.default_view, "home");
        assert_eq!(config.router_options().locale, Locale::En);
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");

        std::fs::write(&path, "default_view = \"../etc\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));

        std::fs::write(&path, "locale = \"fr\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));

        assert!(matches!(
            Config::load(dir.path().join("missing.toml")),
            Err(CoreError::Io(_))
        ));
    }
}
