//! Scrollspy for in-page section navigation
//!
//! Views with a secondary nav (`.main-nav__item a[href="#id"]`) and
//! `section[id]` blocks get one scroll listener on the shell. On every
//! scroll the section under the offset decides which link is active.

use folio_router::{
    EventKind, ListenerId, NavigationEvent, NavigationSubscriber, SectionBox, ShellContext,
    ShellEvent,
};
use parking_lot::Mutex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::Arc;

/// Height of the fixed header sections scroll under
pub const DEFAULT_NAV_OFFSET: f64 = 150.0;

/// Below this offset the first link is active when no section matches
const TOP_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    /// `#section-id`
    pub href: String,
    pub label: String,
}

impl NavLink {
    pub fn target(&self) -> &str {
        self.href.trim_start_matches('#')
    }
}

/// Link to activate for `offset`, or `None` to leave the current one.
///
/// The first section in document order whose `[top, bottom)` contains the
/// offset wins. With no match near the top of the page the first link is
/// the default.
pub fn resolve_active<'a>(
    sections: &[(String, SectionBox)],
    links: &'a [NavLink],
    offset: f64,
) -> Option<&'a NavLink> {
    if let Some((id, _)) = sections.iter().find(|(_, bounds)| bounds.contains(offset)) {
        return links.iter().find(|link| link.target() == id);
    }

    if offset < TOP_THRESHOLD {
        return links.first();
    }

    None
}

#[derive(Default)]
struct SpyState {
    links: Vec<NavLink>,
    /// Section bounds, already shifted by the nav offset
    sections: Vec<(String, SectionBox)>,
    active: Option<String>,
    evaluations: u64,
    listener: Option<ListenerId>,
}

impl SpyState {
    fn evaluate(&mut self, offset: f64) {
        self.evaluations += 1;

        let Some(link) = resolve_active(&self.sections, &self.links, offset) else {
            return;
        };

        if self.active.as_deref() != Some(link.href.as_str()) {
            tracing::trace!(href = %link.href, offset, "Scrollspy link activated");
            self.active = Some(link.href.clone());
        }
    }

    fn reset(&mut self) {
        self.links.clear();
        self.sections.clear();
        self.active = None;
    }
}

/// Cloning shares state, so a host can keep a handle after registering
#[derive(Clone)]
pub struct Scrollspy {
    nav_offset: f64,
    state: Arc<Mutex<SpyState>>,
}

impl Scrollspy {
    pub fn new() -> Self {
        Self::with_nav_offset(DEFAULT_NAV_OFFSET)
    }

    pub fn with_nav_offset(nav_offset: f64) -> Self {
        Self {
            nav_offset,
            state: Arc::new(Mutex::new(SpyState::default())),
        }
    }

    pub fn nav_offset(&self) -> f64 {
        self.nav_offset
    }

    /// `href` of the active link
    pub fn active(&self) -> Option<String> {
        self.state.lock().active.clone()
    }

    pub fn links(&self) -> Vec<NavLink> {
        self.state.lock().links.clone()
    }

    /// Scroll evaluations since creation
    pub fn evaluations(&self) -> u64 {
        self.state.lock().evaluations
    }

    pub fn is_bound(&self) -> bool {
        self.state.lock().listener.is_some()
    }

    fn scan(html: &str) -> (Vec<NavLink>, Vec<String>) {
        let doc = Html::parse_fragment(html);

        let links = match Selector::parse(".main-nav__item a[href^=\"#\"]") {
            Ok(sel) => doc
                .select(&sel)
                .filter_map(|el| {
                    let href = el.value().attr("href")?;
                    if href.len() < 2 {
                        return None;
                    }
                    Some(NavLink {
                        href: href.to_string(),
                        label: el.text().collect::<String>().trim().to_string(),
                    })
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        let sections = match Selector::parse("section[id]") {
            Ok(sel) => doc
                .select(&sel)
                .filter_map(|el| el.value().id().map(str::to_string))
                .collect(),
            Err(_) => Vec::new(),
        };

        (links, sections)
    }
}

impl Default for Scrollspy {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationSubscriber for Scrollspy {
    fn name(&self) -> &str {
        "scrollspy"
    }

    fn on_view_loaded(&mut self, event: &NavigationEvent, shell: &mut ShellContext<'_>) {
        let (links, section_ids) = Self::scan(shell.content());
        let mut state = self.state.lock();

        if let Some(id) = state.listener.take() {
            shell.remove_listener(id);
        }
        state.reset();

        if links.is_empty() || section_ids.is_empty() {
            tracing::debug!(view = %event.view, "No section navigation in view");
            return;
        }

        state.sections = section_ids
            .into_iter()
            .filter_map(|id| {
                let bounds = shell.element_box(&id)?;
                Some((id, bounds.shifted(self.nav_offset)))
            })
            .collect();
        state.links = links;

        let shared = Arc::clone(&self.state);
        let listener = shell.add_listener(EventKind::Scroll, move |event| {
            if let ShellEvent::Scroll { top } = event {
                shared.lock().evaluate(*top);
            }
        });
        state.listener = Some(listener);

        let top = shell.scroll_top();
        state.evaluate(top);

        tracing::debug!(
            view = %event.view,
            links = state.links.len(),
            sections = state.sections.len(),
            "Scrollspy bound"
        );
    }

    fn on_teardown(&mut self, shell: &mut ShellContext<'_>) {
        let mut state = self.state.lock();
        if let Some(id) = state.listener.take() {
            shell.remove_listener(id);
        }
        state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_fragments::{FragmentLoader, StaticSource};
    use folio_history::MemoryHistory;
    use folio_router::{HeadlessShell, RouterOptions, ViewRouter};
    use rstest::rstest;

    const GUIDE: &str = concat!(
        "<nav class=\"main-nav\"><ul class=\"main-nav__list\">",
        "<li class=\"main-nav__item\"><a href=\"#intro\">Intro</a></li>",
        "<li class=\"main-nav__item\"><a href=\"#usage\">Usage</a></li>",
        "</ul></nav>",
        "<section id=\"intro\"><h2>Intro</h2></section>",
        "<section id=\"usage\"><h2>Usage</h2></section>",
    );

    fn links() -> Vec<NavLink> {
        vec![
            NavLink {
                href: "#intro".to_string(),
                label: "Intro".to_string(),
            },
            NavLink {
                href: "#usage".to_string(),
                label: "Usage".to_string(),
            },
        ]
    }

    fn sections(boxes: &[(&str, f64, f64)]) -> Vec<(String, SectionBox)> {
        boxes
            .iter()
            .map(|(id, top, height)| (id.to_string(), SectionBox::new(*top, *height)))
            .collect()
    }

    #[rstest]
    #[case(50.0, Some("#intro"))]
    #[case(0.0, Some("#intro"))]
    #[case(100.0, Some("#usage"))]
    #[case(199.0, Some("#usage"))]
    #[case(250.0, None)]
    fn test_resolve_adjacent_sections(#[case] offset: f64, #[case] expected: Option<&str>) {
        let links = links();
        let sections = sections(&[("intro", 0.0, 100.0), ("usage", 100.0, 100.0)]);

        let active = resolve_active(&sections, &links, offset).map(|link| link.href.as_str());
        assert_eq!(active, expected);
    }

    #[test]
    fn test_first_section_in_document_order_wins() {
        let links = links();
        let sections = sections(&[("intro", 0.0, 150.0), ("usage", 100.0, 100.0)]);

        let active = resolve_active(&sections, &links, 120.0).unwrap();
        assert_eq!(active.href, "#intro");
    }

    #[test]
    fn test_top_of_page_defaults_to_first_link() {
        let links = links();
        let sections = sections(&[("intro", 100.0, 100.0), ("usage", 200.0, 100.0)]);

        assert_eq!(resolve_active(&sections, &links, 0.0).unwrap().href, "#intro");
        assert_eq!(resolve_active(&sections, &links, 9.0).unwrap().href, "#intro");
        assert!(resolve_active(&sections, &links, 50.0).is_none());
    }

    #[test]
    fn test_matched_section_without_link_keeps_current() {
        let links = links();
        let sections = sections(&[("appendix", 0.0, 100.0)]);
        assert!(resolve_active(&sections, &links, 5.0).is_none());
    }

    fn router(shell: HeadlessShell) -> ViewRouter {
        let source = StaticSource::new()
            .with("home.html", "<h1>Home</h1>")
            .with("guide.html", GUIDE);
        ViewRouter::new(
            FragmentLoader::new(Arc::new(source)),
            Box::new(shell),
            Box::new(MemoryHistory::new("")),
            RouterOptions::default(),
        )
    }

    fn scroll_listeners(router: &ViewRouter) -> usize {
        router.with_shell(|shell| shell.listeners().count(&EventKind::Scroll))
    }

    #[tokio::test]
    async fn test_one_update_per_scroll_after_repeated_navigation() {
        let router = router(HeadlessShell::new().with_stacked_sections(100.0));
        let spy = Scrollspy::with_nav_offset(0.0);
        router.subscribe(spy.clone());
        router.initialize().await;

        for _ in 0..5 {
            router.navigate("guide").await;
        }
        router.navigate("home").await;
        router.navigate("guide").await;

        assert_eq!(scroll_listeners(&router), 1);

        let before = spy.evaluations();
        router.scroll_shell(150.0);
        assert_eq!(spy.evaluations(), before + 1);
        assert_eq!(spy.active().as_deref(), Some("#usage"));
    }

    #[tokio::test]
    async fn test_tie_break_through_router() {
        let shell = HeadlessShell::new()
            .with_box("intro", SectionBox::new(150.0, 100.0))
            .with_box("usage", SectionBox::new(250.0, 100.0));
        let router = router(shell);
        let spy = Scrollspy::new();
        router.subscribe(spy.clone());
        router.initialize().await;
        router.navigate("guide").await;

        // Initial evaluation at the reset offset
        assert_eq!(spy.active().as_deref(), Some("#intro"));

        router.scroll_shell(50.0);
        assert_eq!(spy.active().as_deref(), Some("#intro"));

        router.scroll_shell(100.0);
        assert_eq!(spy.active().as_deref(), Some("#usage"));

        // An anchor click lands on the section top and activates it
        router.scroll_shell(0.0);
        assert_eq!(spy.active().as_deref(), Some("#intro"));
    }

    #[tokio::test]
    async fn test_view_without_sections_detaches_listener() {
        let router = router(HeadlessShell::new().with_stacked_sections(100.0));
        let spy = Scrollspy::new();
        router.subscribe(spy.clone());
        router.initialize().await;
        assert!(!spy.is_bound());

        router.navigate("guide").await;
        assert!(spy.is_bound());
        assert_eq!(spy.links(), links());

        router.navigate("home").await;
        assert!(!spy.is_bound());
        assert_eq!(scroll_listeners(&router), 0);
        assert_eq!(spy.active(), None);

        let before = spy.evaluations();
        router.scroll_shell(40.0);
        assert_eq!(spy.evaluations(), before);
    }

    #[tokio::test]
    async fn test_teardown_detaches() {
        let router = router(HeadlessShell::new().with_stacked_sections(100.0));
        let spy = Scrollspy::new();
        router.subscribe(spy.clone());
        router.initialize().await;
        router.navigate("guide").await;

        router.shutdown();
        assert!(!spy.is_bound());
        assert_eq!(scroll_listeners(&router), 0);
    }
}
