//! Sidebar active state and mobile drawer
//!
//! The sidebar lives outside the shell and survives every view swap. Exactly
//! one `.dropdown__btn` is active at a time. Dropdown toggles open their
//! `data-target` content and carry an open marker (the caret) while open.

use folio_fragments::ViewName;
use folio_router::{EventKind, ListenerId, NavigationEvent, NavigationSubscriber, ShellContext};
use parking_lot::Mutex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::SubscriberError;
use crate::Result;

/// Viewports at or below this width use the drawer layout
pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 1024.0;

const MENU_BUTTON_ID: &str = "menu-button";
const OVERLAY_ID: &str = "sidebar-overlay";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarButton {
    pub label: String,
    /// View opened by a final item
    pub view: Option<ViewName>,
    /// Dropdown content toggled by a `dropdown-toggle`
    pub target: Option<String>,
    /// Caret marker, set while the dropdown is open
    pub open_active: bool,
}

impl SidebarButton {
    pub fn is_toggle(&self) -> bool {
        self.target.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarSnapshot {
    pub active: Option<String>,
    pub active_view: Option<ViewName>,
    /// Ids of open dropdown contents
    pub open: Vec<String>,
    pub drawer_open: bool,
}

struct Sidebar {
    buttons: Vec<SidebarButton>,
    /// Dropdown content id -> open
    contents: BTreeMap<String, bool>,
    active: Option<usize>,
    drawer_open: bool,
    viewport_width: f64,
    mobile_breakpoint: f64,
    listeners: Vec<ListenerId>,
}

impl Sidebar {
    fn is_mobile(&self) -> bool {
        self.viewport_width <= self.mobile_breakpoint
    }

    fn item_index(&self, view: &ViewName) -> Option<usize> {
        self.buttons
            .iter()
            .position(|button| !button.is_toggle() && button.view.as_ref() == Some(view))
    }
}

/// Cloning shares state, so a host can keep a handle after registering
#[derive(Clone)]
pub struct SidebarState {
    inner: Arc<Mutex<Sidebar>>,
}

impl SidebarState {
    /// Parse the sidebar markup; the button for `home` starts active
    pub fn parse(markup: &str, home: &ViewName) -> Result<Self> {
        let doc = Html::parse_fragment(markup);

        let Ok(sidebar_sel) = Selector::parse(".sidebar") else {
            return Err(SubscriberError::MissingElement(".sidebar"));
        };
        let Some(sidebar) = doc.select(&sidebar_sel).next() else {
            return Err(SubscriberError::MissingElement(".sidebar"));
        };

        let buttons: Vec<SidebarButton> = match Selector::parse(".dropdown__btn") {
            Ok(sel) => sidebar
                .select(&sel)
                .map(|el| {
                    let is_toggle = el.value().classes().any(|c| c == "dropdown-toggle");
                    SidebarButton {
                        label: el.text().collect::<String>().trim().to_string(),
                        view: el.value().attr("data-view").map(ViewName::new),
                        target: el
                            .value()
                            .attr("data-target")
                            .filter(|_| is_toggle)
                            .map(str::to_string),
                        open_active: el.value().classes().any(|c| c == "dropdown__btn--open-active"),
                    }
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        let contents = match Selector::parse(".dropdown__content[id]") {
            Ok(sel) => sidebar
                .select(&sel)
                .filter_map(|el| {
                    let open = el.value().classes().any(|c| c == "dropdown__content--open");
                    el.value().id().map(|id| (id.to_string(), open))
                })
                .collect(),
            Err(_) => BTreeMap::new(),
        };

        let mut state = Sidebar {
            buttons,
            contents,
            active: None,
            drawer_open: false,
            viewport_width: f64::INFINITY,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            listeners: Vec::new(),
        };
        state.active = state.item_index(home);

        tracing::debug!(
            buttons = state.buttons.len(),
            dropdowns = state.contents.len(),
            "Sidebar parsed"
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(state)),
        })
    }

    pub fn with_mobile_breakpoint(self, width: f64) -> Self {
        self.inner.lock().mobile_breakpoint = width;
        self
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.inner.lock().viewport_width = width;
    }

    pub fn buttons(&self) -> Vec<SidebarButton> {
        self.inner.lock().buttons.clone()
    }

    /// Click on a dropdown toggle. `false` if no toggle controls `target` or
    /// the content does not exist.
    pub fn press_toggle(&self, target: &str) -> bool {
        let mut sidebar = self.inner.lock();

        let Some(index) = sidebar
            .buttons
            .iter()
            .position(|button| button.target.as_deref() == Some(target))
        else {
            return false;
        };
        let Some(open) = sidebar.contents.get_mut(target) else {
            return false;
        };

        let was_open = *open;
        *open = !was_open;
        sidebar.active = Some(index);
        sidebar.buttons[index].open_active = !was_open;

        tracing::debug!(target, open = !was_open, "Dropdown toggled");
        true
    }

    /// Click on a final item. Closes the drawer on mobile viewports.
    pub fn press_item(&self, view: &ViewName) -> bool {
        let mut sidebar = self.inner.lock();

        let Some(index) = sidebar.item_index(view) else {
            return false;
        };
        sidebar.active = Some(index);

        if sidebar.is_mobile() {
            sidebar.drawer_open = false;
        }
        true
    }

    /// Activate the item for a view that was navigated to by other means
    pub fn activate_view(&self, view: &ViewName) -> bool {
        let mut sidebar = self.inner.lock();
        match sidebar.item_index(view) {
            Some(index) => {
                sidebar.active = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn toggle_drawer(&self) -> bool {
        let mut sidebar = self.inner.lock();
        sidebar.drawer_open = !sidebar.drawer_open;
        sidebar.drawer_open
    }

    pub fn close_drawer(&self) {
        self.inner.lock().drawer_open = false;
    }

    pub fn drawer_open(&self) -> bool {
        self.inner.lock().drawer_open
    }

    /// The overlay is shown exactly while the drawer is open
    pub fn overlay_active(&self) -> bool {
        self.drawer_open()
    }

    pub fn active_view(&self) -> Option<ViewName> {
        let sidebar = self.inner.lock();
        sidebar
            .active
            .and_then(|index| sidebar.buttons[index].view.clone())
    }

    pub fn is_open(&self, target: &str) -> bool {
        self.inner.lock().contents.get(target).copied().unwrap_or(false)
    }

    pub fn is_open_active(&self, target: &str) -> bool {
        self.inner
            .lock()
            .buttons
            .iter()
            .any(|button| button.target.as_deref() == Some(target) && button.open_active)
    }

    pub fn snapshot(&self) -> SidebarSnapshot {
        let sidebar = self.inner.lock();
        let active = sidebar.active.map(|index| &sidebar.buttons[index]);

        SidebarSnapshot {
            active: active.map(|button| button.label.clone()),
            active_view: active.and_then(|button| button.view.clone()),
            open: sidebar
                .contents
                .iter()
                .filter(|(_, open)| **open)
                .map(|(id, _)| id.clone())
                .collect(),
            drawer_open: sidebar.drawer_open,
        }
    }

    /// Attach the drawer listeners unless they are still attached
    fn bind_drawer(&self, sidebar: &mut Sidebar, shell: &mut ShellContext<'_>) {
        if !sidebar.listeners.is_empty()
            && sidebar.listeners.iter().all(|id| shell.is_attached(*id))
        {
            return;
        }
        for id in sidebar.listeners.drain(..) {
            shell.remove_listener(id);
        }

        if shell.has_element(MENU_BUTTON_ID) {
            let state = self.clone();
            sidebar.listeners.push(shell.add_listener(
                EventKind::Click(MENU_BUTTON_ID.to_string()),
                move |_| {
                    state.toggle_drawer();
                },
            ));
        }

        if shell.has_element(OVERLAY_ID) {
            let state = self.clone();
            sidebar.listeners.push(shell.add_listener(
                EventKind::Click(OVERLAY_ID.to_string()),
                move |_| state.close_drawer(),
            ));
        }
    }
}

impl NavigationSubscriber for SidebarState {
    fn name(&self) -> &str {
        "sidebar"
    }

    fn on_view_loaded(&mut self, event: &NavigationEvent, shell: &mut ShellContext<'_>) {
        {
            let mut sidebar = self.inner.lock();
            self.bind_drawer(&mut sidebar, shell);
        }

        if !self.activate_view(&event.view) {
            tracing::debug!(view = %event.view, "No sidebar item for view");
        }
    }

    fn on_teardown(&mut self, shell: &mut ShellContext<'_>) {
        let mut sidebar = self.inner.lock();
        for id in sidebar.listeners.drain(..) {
            shell.remove_listener(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_fragments::{FragmentLoader, StaticSource};
    use folio_history::MemoryHistory;
    use folio_router::{HeadlessShell, RouterOptions, ViewRouter};

    const SIDEBAR: &str = r#"
        <aside class="sidebar">
          <button class="dropdown__btn" data-view="home">Home</button>
          <button class="dropdown__btn dropdown-toggle" data-target="foundations-menu">Foundations</button>
          <div id="foundations-menu" class="dropdown__content">
            <a class="dropdown__btn" data-view="foundations/colors">Colors</a>
            <a class="dropdown__btn" data-view="foundations/typography">Typography</a>
          </div>
          <button class="dropdown__btn dropdown-toggle" data-target="missing-menu">Broken</button>
        </aside>
    "#;

    fn sidebar() -> SidebarState {
        SidebarState::parse(SIDEBAR, &ViewName::new("home")).unwrap()
    }

    #[test]
    fn test_parse_starts_on_home() {
        let sidebar = sidebar();
        assert_eq!(sidebar.buttons().len(), 5);
        assert_eq!(sidebar.active_view(), Some(ViewName::new("home")));
        assert!(!sidebar.is_open("foundations-menu"));
        assert!(!sidebar.drawer_open());
    }

    #[test]
    fn test_parse_requires_sidebar() {
        let result = SidebarState::parse("<nav></nav>", &ViewName::new("home"));
        assert!(matches!(result, Err(SubscriberError::MissingElement(".sidebar"))));
    }

    #[test]
    fn test_toggle_opens_and_takes_focus() {
        let sidebar = sidebar();

        assert!(sidebar.press_toggle("foundations-menu"));
        assert!(sidebar.is_open("foundations-menu"));
        assert!(sidebar.is_open_active("foundations-menu"));
        assert_eq!(sidebar.snapshot().active.as_deref(), Some("Foundations"));
        assert_eq!(sidebar.active_view(), None);

        assert!(sidebar.press_toggle("foundations-menu"));
        assert!(!sidebar.is_open("foundations-menu"));
        assert!(!sidebar.is_open_active("foundations-menu"));
        // Closing keeps the focus on the toggle
        assert_eq!(sidebar.snapshot().active.as_deref(), Some("Foundations"));
    }

    #[test]
    fn test_toggle_without_content_is_ignored() {
        let sidebar = sidebar();
        assert!(!sidebar.press_toggle("missing-menu"));
        assert!(!sidebar.press_toggle("nowhere"));
        assert_eq!(sidebar.active_view(), Some(ViewName::new("home")));
    }

    #[test]
    fn test_item_click_closes_drawer_only_on_mobile() {
        let sidebar = sidebar();

        sidebar.set_viewport_width(1440.0);
        sidebar.toggle_drawer();
        assert!(sidebar.press_item(&ViewName::new("foundations/colors")));
        assert!(sidebar.drawer_open());

        sidebar.set_viewport_width(1024.0);
        assert!(sidebar.press_item(&ViewName::new("foundations/typography")));
        assert!(!sidebar.drawer_open());
        assert!(!sidebar.overlay_active());
        assert_eq!(
            sidebar.active_view(),
            Some(ViewName::new("foundations/typography"))
        );
    }

    #[test]
    fn test_single_active_button() {
        let sidebar = sidebar();
        sidebar.press_item(&ViewName::new("foundations/colors"));
        sidebar.press_toggle("foundations-menu");

        let snapshot = sidebar.snapshot();
        assert_eq!(snapshot.active.as_deref(), Some("Foundations"));
        assert_eq!(snapshot.open, vec!["foundations-menu".to_string()]);
    }

    fn router(shell: HeadlessShell) -> ViewRouter {
        let source = StaticSource::new()
            .with("home.html", "<h1>Home</h1>")
            .with("foundations/colors.html", "<h1>Colors</h1>")
            .with("changelog.html", "<h1>Changelog</h1>");
        ViewRouter::new(
            FragmentLoader::new(Arc::new(source)),
            Box::new(shell),
            Box::new(MemoryHistory::new("")),
            RouterOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_navigation_activates_matching_item() {
        let router = router(HeadlessShell::new());
        let sidebar = sidebar();
        router.subscribe(sidebar.clone());
        router.initialize().await;

        router.navigate("foundations/colors").await;
        assert_eq!(sidebar.active_view(), Some(ViewName::new("foundations/colors")));

        // No item for the view: the previous one stays active
        router.navigate("changelog").await;
        assert_eq!(sidebar.active_view(), Some(ViewName::new("foundations/colors")));
    }

    #[tokio::test]
    async fn test_drawer_listeners_bound_once() {
        let router = router(HeadlessShell::new().with_chrome([MENU_BUTTON_ID, OVERLAY_ID]));
        let sidebar = sidebar();
        router.subscribe(sidebar.clone());
        router.initialize().await;
        router.navigate("foundations/colors").await;
        router.navigate("home").await;

        let menu_listeners = router.with_shell(|shell| {
            shell
                .listeners()
                .count(&EventKind::Click(MENU_BUTTON_ID.to_string()))
        });
        assert_eq!(menu_listeners, 1);

        router.click(MENU_BUTTON_ID);
        assert!(sidebar.drawer_open());
        router.click(OVERLAY_ID);
        assert!(!sidebar.drawer_open());
    }
}
