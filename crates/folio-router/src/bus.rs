//! Navigation-completed notifications
//!
//! Subscribers are invoked synchronously, in registration order, after the
//! shell content has been replaced and its scroll offset reset.

use chrono::{DateTime, Utc};
use folio_fragments::ViewName;
use serde::Serialize;

use crate::shell::{Shell, ShellContext};
use crate::state::{NavigationKind, RenderOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationEvent {
    pub view: ViewName,
    /// Request number that produced this render
    pub sequence: u64,
    pub kind: NavigationKind,
    pub outcome: RenderOutcome,
    pub completed_at: DateTime<Utc>,
}

/// A module that must re-bind after every view swap.
///
/// Implementations must not accumulate listeners across navigations and
/// must treat a view without their target elements as nothing to do.
pub trait NavigationSubscriber: Send {
    fn name(&self) -> &str;

    fn on_view_loaded(&mut self, event: &NavigationEvent, shell: &mut ShellContext<'_>);

    /// Called once when the router shuts down; detach everything here
    fn on_teardown(&mut self, _shell: &mut ShellContext<'_>) {}
}

/// Adapter for subscribers that only need the event
pub struct FnSubscriber<F> {
    name: String,
    handler: F,
}

impl<F> FnSubscriber<F>
where
    F: FnMut(&NavigationEvent) + Send,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> NavigationSubscriber for FnSubscriber<F>
where
    F: FnMut(&NavigationEvent) + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_view_loaded(&mut self, event: &NavigationEvent, _shell: &mut ShellContext<'_>) {
        (self.handler)(event)
    }
}

#[derive(Default)]
pub struct NavigationBus {
    subscribers: Vec<Box<dyn NavigationSubscriber>>,
}

impl NavigationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn NavigationSubscriber>) {
        tracing::debug!(subscriber = subscriber.name(), "Registered navigation subscriber");
        self.subscribers.push(subscriber);
    }

    pub fn publish(&mut self, event: &NavigationEvent, shell: &mut dyn Shell) {
        for subscriber in &mut self.subscribers {
            let mut ctx = ShellContext::new(&mut *shell);
            subscriber.on_view_loaded(event, &mut ctx);
        }
    }

    /// Tear every subscriber down and drop it
    pub fn teardown(&mut self, shell: &mut dyn Shell) {
        for mut subscriber in self.subscribers.drain(..) {
            let mut ctx = ShellContext::new(&mut *shell);
            subscriber.on_teardown(&mut ctx);
            tracing::debug!(subscriber = subscriber.name(), "Tore down navigation subscriber");
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.subscribers.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
