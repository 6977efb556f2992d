//! Hash locators
//!
//! The visible address names the current view as `#/<view>`. Plain
//! fragments without the leading slash (`#intro`) are in-page anchors and
//! never name a view.

use folio_fragments::ViewName;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// No fragment, or a bare `#` / `#/`
    Empty,
    /// `#/<view>`
    View(ViewName),
    /// Some other fragment, such as an in-page anchor
    Foreign(String),
}

impl Locator {
    /// Parse a full URL, a relative address or a bare fragment
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if input.is_empty() {
            return Locator::Empty;
        }

        if input.contains("://") {
            return match Url::parse(input) {
                Ok(url) => url.fragment().map(Self::parse_fragment).unwrap_or(Locator::Empty),
                Err(_) => Locator::Foreign(input.to_string()),
            };
        }

        match input.split_once('#') {
            Some((_, fragment)) => Self::parse_fragment(fragment),
            None => Locator::Empty,
        }
    }

    fn parse_fragment(fragment: &str) -> Self {
        match fragment.strip_prefix('/') {
            Some("") => Locator::Empty,
            Some(view) => Locator::View(ViewName::new(view)),
            None if fragment.is_empty() => Locator::Empty,
            None => Locator::Foreign(fragment.to_string()),
        }
    }

    pub fn for_view(view: &ViewName) -> String {
        format!("#/{}", view)
    }

    pub fn view(&self) -> Option<&ViewName> {
        match self {
            Locator::View(view) => Some(view),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", Locator::Empty)]
    #[case("#", Locator::Empty)]
    #[case("#/", Locator::Empty)]
    #[case("index.html", Locator::Empty)]
    #[case("#/home", Locator::View(ViewName::new("home")))]
    #[case("/index.html#/foundations/colors", Locator::View(ViewName::new("foundations/colors")))]
    #[case(
        "https://docs.example.com/index.html#/components/button",
        Locator::View(ViewName::new("components/button"))
    )]
    #[case("https://docs.example.com/", Locator::Empty)]
    #[case("#intro", Locator::Foreign("intro".to_string()))]
    fn test_parse(#[case] input: &str, #[case] expected: Locator) {
        assert_eq!(Locator::parse(input), expected);
    }

    #[test]
    fn test_for_view() {
        assert_eq!(Locator::for_view(&ViewName::new("home")), "#/home");
        let parsed = Locator::parse(&Locator::for_view(&ViewName::new("a/b")));
        assert_eq!(parsed.view(), Some(&ViewName::new("a/b")));
    }
}
