//! Navigation steps given on the command line

use folio_core::{NavigationOutcome, Site, ViewName};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Visit(ViewName),
    /// Click on a `data-view` link, `follow:<view>`
    Follow(ViewName),
    Back,
    Forward,
}

impl Step {
    pub async fn apply(&self, site: &Site) -> folio_core::Result<NavigationOutcome> {
        let router = site.router();
        match self {
            Step::Visit(view) => Ok(router.navigate(view.clone()).await),
            Step::Follow(view) => site.follow(view.clone()).await,
            Step::Back => Ok(router.back().await),
            Step::Forward => Ok(router.forward().await),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Visit(view) => write!(f, "{}", view),
            Step::Follow(view) => write!(f, "follow:{}", view),
            Step::Back => write!(f, "back"),
            Step::Forward => write!(f, "forward"),
        }
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" => Err("Empty step".to_string()),
            "back" => Ok(Step::Back),
            "forward" => Ok(Step::Forward),
            _ if s.starts_with("follow:") => match s.trim_start_matches("follow:").trim() {
                "" => Err("Missing view after follow:".to_string()),
                view => Ok(Step::Follow(ViewName::new(view))),
            },
            view => Ok(Step::Visit(ViewName::new(view.trim_start_matches("#/")))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!("back".parse::<Step>().unwrap(), Step::Back);
        assert_eq!(" forward ".parse::<Step>().unwrap(), Step::Forward);
        assert_eq!(
            "foundations/colors".parse::<Step>().unwrap(),
            Step::Visit(ViewName::new("foundations/colors"))
        );
        assert_eq!(
            "#/guide".parse::<Step>().unwrap(),
            Step::Visit(ViewName::new("guide"))
        );
        assert_eq!(
            "follow:home".parse::<Step>().unwrap(),
            Step::Follow(ViewName::new("home"))
        );
        assert!("follow:".parse::<Step>().is_err());
        assert!("  ".parse::<Step>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["back", "forward", "home", "follow:guide"] {
            assert_eq!(raw.parse::<Step>().unwrap().to_string(), raw);
        }
    }
}
