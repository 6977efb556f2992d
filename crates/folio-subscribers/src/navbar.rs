//! Top navigation bar state
//!
//! The bar is marked active while the shell is scrolled away from the top.
//! It lives outside the shell, so one scroll listener is attached and kept
//! across view swaps.

use folio_router::{
    EventKind, ListenerId, NavigationEvent, NavigationSubscriber, ShellContext, ShellEvent,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct NavBarState {
    active: bool,
    listener: Option<ListenerId>,
}

impl NavBarState {
    fn update(&mut self, top: f64) {
        let active = top > 0.0;
        if active != self.active {
            tracing::trace!(active, top, "Nav bar toggled");
            self.active = active;
        }
    }
}

/// Cloning shares state, so a host can keep a handle after registering
#[derive(Clone, Default)]
pub struct NavBar {
    state: Arc<Mutex<NavBarState>>,
}

impl NavBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bar carries its `active` marker
    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    pub fn is_bound(&self) -> bool {
        self.state.lock().listener.is_some()
    }
}

impl NavigationSubscriber for NavBar {
    fn name(&self) -> &str {
        "nav-bar"
    }

    fn on_view_loaded(&mut self, _event: &NavigationEvent, shell: &mut ShellContext<'_>) {
        let mut state = self.state.lock();

        // The router has already reset the scroll offset
        state.update(shell.scroll_top());

        if let Some(id) = state.listener {
            if shell.is_attached(id) {
                return;
            }
        }

        let shared = Arc::clone(&self.state);
        let id = shell.add_listener(EventKind::Scroll, move |event| {
            if let ShellEvent::Scroll { top } = event {
                shared.lock().update(*top);
            }
        });
        state.listener = Some(id);
    }

    fn on_teardown(&mut self, shell: &mut ShellContext<'_>) {
        let mut state = self.state.lock();
        if let Some(id) = state.listener.take() {
            shell.remove_listener(id);
        }
        state.active = false;
    }
}
