//! Site context
//!
//! One owned object per page: created once, initialized, shut down. Nothing
//! in the navigation subsystem lives in globals.

use std::sync::Arc;

use folio_fragments::{source_for_root, FragmentLoader, FragmentSource};
use folio_history::{BrowserHistory, MemoryHistory};
use folio_fragments::ViewName;
use folio_router::{HeadlessShell, NavigationOutcome, Shell, ViewRouter};
use folio_storage::Database;
use folio_subscribers::{NavBar, Scrollspy, SidebarState, ThemeToggle, THEME_BUTTON_ID};

use crate::config::Config;
use crate::Result;

/// Persistent page elements outside the shell
const CHROME_IDS: [&str; 3] = [THEME_BUTTON_ID, "menu-button", "sidebar-overlay"];

pub struct Site {
    config: Config,
    db: Database,
    router: ViewRouter,
    scrollspy: Scrollspy,
    nav_bar: NavBar,
    sidebar: Option<SidebarState>,
    theme: ThemeToggle,
}

impl Site {
    /// Headless site over the configured fragment root
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Database::open(&config.settings_path)?;
        let source = source_for_root(&config.fragment_root, config.fetch_timeout())?;
        let shell = HeadlessShell::new().with_chrome(CHROME_IDS);

        Self::with_parts(
            config,
            db,
            source,
            Box::new(shell),
            Box::new(MemoryHistory::default()),
        )
    }

    /// Site over host-provided transport, shell and history
    pub fn with_parts(
        config: Config,
        db: Database,
        source: Arc<dyn FragmentSource>,
        shell: Box<dyn Shell>,
        history: Box<dyn BrowserHistory>,
    ) -> Result<Self> {
        let loader = FragmentLoader::new(source)
            .with_extension(config.fragment_extension.clone())
            .with_timeout(config.fetch_timeout());
        let router = ViewRouter::new(loader, shell, history, config.router_options());

        let scrollspy = Scrollspy::with_nav_offset(config.nav_offset);
        let nav_bar = NavBar::new();

        let sidebar = match &config.sidebar_path {
            Some(path) => {
                let markup = std::fs::read_to_string(path)?;
                Some(
                    SidebarState::parse(&markup, &config.default_view)?
                        .with_mobile_breakpoint(config.mobile_breakpoint),
                )
            }
            None => None,
        };

        let theme = ThemeToggle::new(db.clone()).with_system_preference(config.system_prefers_dark);

        // Registration order is notification order
        router.subscribe(scrollspy.clone());
        router.subscribe(nav_bar.clone());
        if let Some(sidebar) = &sidebar {
            router.add_persistent_links(
                sidebar
                    .buttons()
                    .into_iter()
                    .filter(|button| !button.is_toggle())
                    .filter_map(|button| button.view),
            );
            router.subscribe(sidebar.clone());
        }
        router.subscribe(theme.clone());

        tracing::info!(
            root = %config.fragment_root,
            default_view = %config.default_view,
            locale = %config.locale,
            "Site created"
        );

        Ok(Self {
            config,
            db,
            router,
            scrollspy,
            nav_bar,
            sidebar,
            theme,
        })
    }

    /// Render the default view
    pub async fn initialize(&self) -> NavigationOutcome {
        let outcome = self.router.initialize().await;
        tracing::info!("Site initialized");
        outcome
    }

    /// Click on a `[data-view]` link in the shell or the sidebar
    pub async fn follow(&self, view: impl Into<ViewName>) -> Result<NavigationOutcome> {
        let navigation = self.router.follow(view)?;
        Ok(navigation.await)
    }

    /// Click on a final sidebar item: mark it active, then open its view
    pub async fn press_sidebar_item(&self, view: impl Into<ViewName>) -> Result<NavigationOutcome> {
        let view = view.into();
        if let Some(sidebar) = &self.sidebar {
            sidebar.press_item(&view);
        }
        self.follow(view).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    pub fn scrollspy(&self) -> &Scrollspy {
        &self.scrollspy
    }

    pub fn nav_bar(&self) -> &NavBar {
        &self.nav_bar
    }

    pub fn sidebar(&self) -> Option<&SidebarState> {
        self.sidebar.as_ref()
    }

    pub fn theme(&self) -> &ThemeToggle {
        &self.theme
    }

    /// Detach every subscriber and drop the site
    pub fn shutdown(self) {
        self.router.shutdown();
        tracing::info!("Site shut down");
    }
}
