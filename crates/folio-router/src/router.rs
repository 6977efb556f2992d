//! View router
//!
//! Owns the shell, the navigation state and the history controller. Every
//! request takes a sequence number when it is issued; once its fragment has
//! loaded it may only render if no newer request has been issued since.

use chrono::Utc;
use parking_lot::Mutex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use folio_fragments::{FragmentLoader, FragmentResult, ViewName};
use folio_history::{BrowserHistory, Locator, ViewHistoryController};

use crate::bus::{NavigationBus, NavigationEvent, NavigationSubscriber};
use crate::error::RouterError;
use crate::render::{error_block, Locale};
use crate::shell::{Shell, ShellEvent};
use crate::state::{NavigationKind, NavigationState, RenderOutcome};
use crate::Result;

#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// View rendered at startup and linked from error blocks
    pub default_view: ViewName,
    pub locale: Locale,
    /// Buffered events per broadcast receiver
    pub event_capacity: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            default_view: ViewName::default(),
            locale: Locale::default(),
            event_capacity: 64,
        }
    }
}

/// Result of one navigation request
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// The shell now shows the view (content or error block)
    Rendered(NavigationEvent),
    /// A newer request was issued before this one finished loading
    Superseded { view: ViewName, sequence: u64 },
    /// A history move that did not lead to a recoverable view
    Ignored,
}

impl NavigationOutcome {
    pub fn event(&self) -> Option<&NavigationEvent> {
        match self {
            NavigationOutcome::Rendered(event) => Some(event),
            _ => None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, NavigationOutcome::Rendered(_))
    }
}

struct RouterCore {
    shell: Box<dyn Shell>,
    history: ViewHistoryController,
    state: NavigationState,
    bus: NavigationBus,
    /// `data-view` targets outside the shell (sidebar items)
    persistent_links: Vec<ViewName>,
}

struct RouterInner {
    loader: FragmentLoader,
    options: RouterOptions,
    /// Highest sequence number issued so far
    sequence: AtomicU64,
    core: Mutex<RouterCore>,
    events: broadcast::Sender<NavigationEvent>,
}

#[derive(Clone)]
pub struct ViewRouter {
    inner: Arc<RouterInner>,
}

impl ViewRouter {
    pub fn new(
        loader: FragmentLoader,
        shell: Box<dyn Shell>,
        history: Box<dyn BrowserHistory>,
        options: RouterOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        let state = NavigationState::new(options.default_view.clone());

        Self {
            inner: Arc::new(RouterInner {
                loader,
                sequence: AtomicU64::new(0),
                core: Mutex::new(RouterCore {
                    shell,
                    history: ViewHistoryController::new(history),
                    state,
                    bus: NavigationBus::new(),
                    persistent_links: Vec::new(),
                }),
                events,
                options,
            }),
        }
    }

    pub fn default_view(&self) -> &ViewName {
        &self.inner.options.default_view
    }

    pub fn locale(&self) -> Locale {
        self.inner.options.locale
    }

    /// Register a subscriber; it runs after every completed render
    pub fn subscribe<S>(&self, subscriber: S)
    where
        S: NavigationSubscriber + 'static,
    {
        self.inner.core.lock().bus.subscribe(Box::new(subscriber));
    }

    /// Receiver for navigation events, for observers outside the render path
    pub fn events(&self) -> broadcast::Receiver<NavigationEvent> {
        self.inner.events.subscribe()
    }

    /// Register a handler for recovered history pops. Handlers run while the
    /// router is locked and must not call back into it.
    pub fn on_pop<F>(&self, handler: F)
    where
        F: Fn(&ViewName) + Send + 'static,
    {
        self.inner.core.lock().history.on_pop(handler);
    }

    /// First render at startup.
    ///
    /// Any locator the page was opened with is normalized to the default
    /// view by replacing the current record, so startup never pushes.
    pub fn initialize(&self) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        let sequence = self.next_sequence();
        let view = self.inner.options.default_view.clone();

        {
            let mut core = self.inner.core.lock();
            let locator = core.history.locator();
            if let Locator::View(requested) = &locator {
                if *requested != view {
                    tracing::info!(
                        requested = %requested,
                        default_view = %view,
                        "Normalizing deep link to the default view"
                    );
                }
            }
            if let Err(e) = core.history.replace_view(&view) {
                tracing::error!(view = %view, error = %e, "Failed to replace initial history entry");
            }
        }

        self.load_and_apply(sequence, view, NavigationKind::Initial)
    }

    /// Navigate to `view`, pushing a history record once it is shown
    pub fn navigate(
        &self,
        view: impl Into<ViewName>,
    ) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        let sequence = self.next_sequence();
        self.load_and_apply(sequence, view.into(), NavigationKind::Push)
    }

    pub fn back(&self) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        self.go(-1)
    }

    pub fn forward(&self) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        self.go(1)
    }

    /// Move through the history stack and render the record we land on
    pub fn go(&self, delta: isize) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        let recovered = self.inner.core.lock().history.go(delta);
        self.render_popped(recovered)
    }

    /// Popstate from a host whose browser already moved the stack
    pub fn handle_popstate(
        &self,
        state: Option<Value>,
    ) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        let recovered = self.inner.core.lock().history.dispatch_pop(state.as_ref());
        self.render_popped(recovered)
    }

    fn render_popped(
        &self,
        recovered: Option<ViewName>,
    ) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        let router = self.clone();
        // Stale pops keep the current view and do not claim a sequence number
        let request = recovered.map(|view| (router.next_sequence(), view));

        async move {
            match request {
                Some((sequence, view)) => {
                    router
                        .load_and_apply(sequence, view, NavigationKind::Pop)
                        .await
                }
                None => NavigationOutcome::Ignored,
            }
        }
    }

    fn next_sequence(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn load_and_apply(
        &self,
        sequence: u64,
        view: ViewName,
        kind: NavigationKind,
    ) -> impl Future<Output = NavigationOutcome> + Send + 'static {
        let router = self.clone();

        async move {
            tracing::debug!(view = %view, sequence, kind = %kind, "Navigation requested");
            let result = router.inner.loader.load(&view).await;
            router.apply(sequence, view, kind, result)
        }
    }

    fn apply(
        &self,
        sequence: u64,
        view: ViewName,
        kind: NavigationKind,
        result: FragmentResult,
    ) -> NavigationOutcome {
        let mut core = self.inner.core.lock();

        let latest = self.inner.sequence.load(Ordering::SeqCst);
        if sequence != latest {
            tracing::debug!(
                view = %view,
                sequence,
                latest,
                "Discarding stale render"
            );
            return NavigationOutcome::Superseded { view, sequence };
        }

        let outcome = self.render(&mut core, result, &view);

        if kind.pushes_history() {
            if let Err(e) = core.history.push_view(&view) {
                tracing::error!(view = %view, error = %e, "Failed to push history entry");
            }
        }

        core.shell.set_scroll_top(0.0);

        core.state.current_view = view.clone();
        core.state.history_depth = core.history.len();

        let event = NavigationEvent {
            view,
            sequence,
            kind,
            outcome,
            completed_at: Utc::now(),
        };

        let RouterCore { shell, bus, .. } = &mut *core;
        bus.publish(&event, shell.as_mut());

        // Sent under the lock so receivers see bus order. No receivers is fine.
        let _ = self.inner.events.send(event.clone());

        tracing::info!(
            view = %event.view,
            sequence,
            kind = %event.kind,
            outcome = %event.outcome,
            history_depth = core.state.history_depth,
            "View rendered"
        );
        drop(core);

        NavigationOutcome::Rendered(event)
    }

    /// Put the result into the shell. Never fails: if the shell refuses the
    /// markup, the network error block is shown instead.
    fn render(&self, core: &mut RouterCore, result: FragmentResult, view: &ViewName) -> RenderOutcome {
        let options = &self.inner.options;

        let (html, outcome) = match result {
            FragmentResult::Ok { html } => (html, RenderOutcome::Loaded),
            FragmentResult::NotFound { view } => (
                error_block(RenderOutcome::NotFound, &view, &options.default_view, options.locale),
                RenderOutcome::NotFound,
            ),
            FragmentResult::NetworkError { view, detail } => {
                tracing::error!(
                    view = %view,
                    detail = %detail,
                    timestamp = %Utc::now().to_rfc3339(),
                    "Router error"
                );
                (
                    error_block(
                        RenderOutcome::NetworkError,
                        &view,
                        &options.default_view,
                        options.locale,
                    ),
                    RenderOutcome::NetworkError,
                )
            }
        };

        match core.shell.replace_content(&html) {
            Ok(()) => outcome,
            Err(e) => {
                tracing::error!(view = %view, error = %e, "Shell rejected content");
                let fallback = error_block(
                    RenderOutcome::NetworkError,
                    view,
                    &options.default_view,
                    options.locale,
                );
                if let Err(e) = core.shell.replace_content(&fallback) {
                    tracing::error!(view = %view, error = %e, "Shell rejected error block");
                }
                RenderOutcome::NetworkError
            }
        }
    }

    /// User scrolled the shell; scroll listeners run after the shell is
    /// released
    pub fn scroll_shell(&self, offset: f64) {
        let (event, listeners) = {
            let mut core = self.inner.core.lock();
            core.shell.set_scroll_top(offset);
            let event = ShellEvent::Scroll {
                top: core.shell.scroll_top(),
            };
            let listeners = core.shell.listeners().matching(&event);
            (event, listeners)
        };

        for listener in listeners {
            listener(&event);
        }
    }

    /// User clicked the element with `target` id
    pub fn click(&self, target: &str) {
        let event = ShellEvent::Click {
            target: target.to_string(),
        };
        let listeners = self.inner.core.lock().shell.listeners().matching(&event);

        for listener in listeners {
            listener(&event);
        }
    }

    /// Views linked from the current content via `data-view`, in document
    /// order
    pub fn links(&self) -> Vec<ViewName> {
        content_links(self.inner.core.lock().shell.content())
    }

    /// Register `data-view` targets that live outside the shell and survive
    /// content swaps
    pub fn add_persistent_links<I>(&self, views: I)
    where
        I: IntoIterator<Item = ViewName>,
    {
        let mut core = self.inner.core.lock();
        for view in views {
            if !core.persistent_links.contains(&view) {
                core.persistent_links.push(view);
            }
        }
    }

    pub fn persistent_links(&self) -> Vec<ViewName> {
        self.inner.core.lock().persistent_links.clone()
    }

    /// User clicked a `[data-view]` element.
    ///
    /// The view must be linked from the current content or from the
    /// persistent navigation; the navigation then runs like [`navigate`].
    ///
    /// [`navigate`]: ViewRouter::navigate
    pub fn follow(
        &self,
        view: impl Into<ViewName>,
    ) -> Result<impl Future<Output = NavigationOutcome> + Send + 'static> {
        let view = view.into();

        let linked = {
            let core = self.inner.core.lock();
            core.persistent_links.contains(&view)
                || content_links(core.shell.content()).contains(&view)
        };
        if !linked {
            tracing::debug!(view = %view, "Ignoring click on an unlinked view");
            return Err(RouterError::UnlinkedView(view));
        }

        tracing::debug!(view = %view, "Following link");
        Ok(self.navigate(view))
    }

    pub fn state(&self) -> NavigationState {
        self.inner.core.lock().state.clone()
    }

    pub fn current_view(&self) -> ViewName {
        self.inner.core.lock().state.current_view.clone()
    }

    /// Address of the current history record
    pub fn location(&self) -> String {
        self.inner.core.lock().history.location().to_string()
    }

    pub fn history_len(&self) -> usize {
        self.inner.core.lock().history.len()
    }

    /// Read access to the shell
    pub fn with_shell<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&dyn Shell) -> T,
    {
        let core = self.inner.core.lock();
        f(core.shell.as_ref())
    }

    pub fn subscriber_names(&self) -> Vec<String> {
        self.inner.core.lock().bus.names()
    }

    /// Tear down every subscriber. Requests still in flight become stale.
    pub fn shutdown(&self) {
        self.next_sequence();
        let mut core = self.inner.core.lock();
        let RouterCore { shell, bus, .. } = &mut *core;
        bus.teardown(shell.as_mut());
        tracing::info!("Router shut down");
    }
}

fn content_links(html: &str) -> Vec<ViewName> {
    let doc = Html::parse_fragment(html);
    let Ok(sel) = Selector::parse("[data-view]") else {
        return Vec::new();
    };

    doc.select(&sel)
        .filter_map(|el| el.value().attr("data-view"))
        .filter(|view| !view.trim().is_empty())
        .map(ViewName::new)
        .collect()
}
