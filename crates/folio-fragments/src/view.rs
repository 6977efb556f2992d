//! View names
//!
//! A view name is an opaque identifier such as `home` or
//! `foundations/colors`. It only becomes a path once it has been checked to
//! stay inside the fragment root.

use serde::{Deserialize, Serialize};
use std::fmt;

/// View shown at startup and linked from every error presentation
pub const DEFAULT_VIEW: &str = "home";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewName(String);

impl ViewName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the name is a relative path that cannot leave the root.
    ///
    /// Segments are separated by `/` and may only contain ASCII
    /// alphanumerics, `-`, `_` and `.`; `.` and `..` segments, empty
    /// segments, backslashes and percent-escapes are refused.
    pub fn is_safe(&self) -> bool {
        if self.0.is_empty() {
            return false;
        }

        self.0.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        })
    }

    /// Path of the fragment relative to the root, or `None` if unsafe
    pub fn fragment_path(&self, extension: &str) -> Option<String> {
        if !self.is_safe() {
            return None;
        }
        Some(format!("{}{}", self.0, extension))
    }
}

impl Default for ViewName {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW)
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ViewName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ViewName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ViewName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::str::FromStr for ViewName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl PartialEq<str> for ViewName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ViewName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("home")]
    #[case("foundations/colors")]
    #[case("components/button-group")]
    #[case("v1.2/release_notes")]
    fn test_safe_names(#[case] name: &str) {
        assert!(ViewName::new(name).is_safe());
    }

    #[rstest]
    #[case("")]
    #[case("../secret")]
    #[case("foundations/../../etc/passwd")]
    #[case("/etc/passwd")]
    #[case("foundations//colors")]
    #[case("colors/")]
    #[case("./home")]
    #[case("..\\windows")]
    #[case("%2e%2e/secret")]
    #[case("home page")]
    #[case("home?x=1")]
    fn test_unsafe_names(#[case] name: &str) {
        assert!(!ViewName::new(name).is_safe());
        assert!(ViewName::new(name).fragment_path(".html").is_none());
    }

    #[test]
    fn test_fragment_path() {
        let view = ViewName::new("foundations/colors");
        assert_eq!(
            view.fragment_path(".html"),
            Some("foundations/colors.html".to_string())
        );
    }

    #[test]
    fn test_default_and_display() {
        let view = ViewName::default();
        assert_eq!(view, "home");
        assert_eq!(view.to_string(), "home");
    }
}
