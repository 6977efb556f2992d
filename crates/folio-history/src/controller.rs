//! View history controller
//!
//! Wraps a [`BrowserHistory`] so that records are only created for real
//! navigations and pops are only reported for records we can recover.

use folio_fragments::ViewName;
use serde_json::Value;

use crate::browser::BrowserHistory;
use crate::entry::HistoryEntry;
use crate::locator::Locator;
use crate::Result;

type PopHandler = Box<dyn Fn(&ViewName) + Send>;

pub struct ViewHistoryController {
    history: Box<dyn BrowserHistory>,
    handlers: Vec<PopHandler>,
}

impl ViewHistoryController {
    pub fn new(history: Box<dyn BrowserHistory>) -> Self {
        Self {
            history,
            handlers: Vec::new(),
        }
    }

    /// Record a user or programmatic navigation
    pub fn push_view(&mut self, view: &ViewName) -> Result<()> {
        let entry = HistoryEntry::new(view.clone());
        self.history.push_state(entry.to_state()?, &entry.locator());

        tracing::debug!(view = %view, depth = self.history.len(), "Pushed history entry");

        Ok(())
    }

    /// Rewrite the current record; used for the initial load
    pub fn replace_view(&mut self, view: &ViewName) -> Result<()> {
        let entry = HistoryEntry::new(view.clone());
        self.history.replace_state(entry.to_state()?, &entry.locator());

        tracing::debug!(view = %view, depth = self.history.len(), "Replaced history entry");

        Ok(())
    }

    /// Register a handler for recovered pops
    pub fn on_pop<F>(&mut self, handler: F)
    where
        F: Fn(&ViewName) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Handle a popstate payload.
    ///
    /// Returns the recovered view after notifying every handler, or `None`
    /// (and notifies nobody) when the state is stale.
    pub fn dispatch_pop(&self, state: Option<&Value>) -> Option<ViewName> {
        match HistoryEntry::from_state(state) {
            Ok(entry) => {
                for handler in &self.handlers {
                    handler(&entry.view);
                }
                Some(entry.view)
            }
            Err(e) => {
                tracing::warn!(
                    location = %self.history.location(),
                    error = %e,
                    "Ignoring pop to stale history entry"
                );
                None
            }
        }
    }

    /// Move back one record; the recovered view, if any
    pub fn back(&mut self) -> Option<ViewName> {
        self.go(-1)
    }

    /// Move forward one record; the recovered view, if any
    pub fn forward(&mut self) -> Option<ViewName> {
        self.go(1)
    }

    pub fn go(&mut self, delta: isize) -> Option<ViewName> {
        let event = self.history.go(delta)?;
        self.dispatch_pop(event.state.as_ref())
    }

    /// Locator of the current record, as the page was opened with
    pub fn locator(&self) -> Locator {
        Locator::parse(self.history.location())
    }

    pub fn location(&self) -> &str {
        self.history.location()
    }

    /// View stored in the current record, if recoverable
    pub fn current_view(&self) -> Option<ViewName> {
        HistoryEntry::from_state(self.history.state())
            .ok()
            .map(|entry| entry.view)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn index(&self) -> usize {
        self.history.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemoryHistory;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn controller(initial: &str) -> ViewHistoryController {
        ViewHistoryController::new(Box::new(MemoryHistory::new(initial)))
    }

    #[test]
    fn test_replace_does_not_add_records() {
        let mut history = controller("#/components/card");
        assert_eq!(history.locator(), Locator::View(ViewName::new("components/card")));

        history.replace_view(&ViewName::new("home")).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.location(), "#/home");
        assert_eq!(history.current_view(), Some(ViewName::new("home")));
    }

    #[test]
    fn test_back_and_forward_recover_views() {
        let mut history = controller("");
        history.replace_view(&ViewName::new("home")).unwrap();
        history.push_view(&ViewName::new("foo")).unwrap();
        history.push_view(&ViewName::new("bar")).unwrap();

        assert_eq!(history.back(), Some(ViewName::new("foo")));
        assert_eq!(history.back(), Some(ViewName::new("home")));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some(ViewName::new("foo")));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_handlers_receive_recovered_views_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut history = controller("");

        let sink = Arc::clone(&seen);
        history.on_pop(move |view| sink.lock().unwrap().push(view.to_string()));

        history.dispatch_pop(Some(&json!({ "view": "foo" })));
        history.dispatch_pop(None);
        history.dispatch_pop(Some(&json!({ "route": "bar" })));

        assert_eq!(*seen.lock().unwrap(), vec!["foo".to_string()]);
    }

    #[test]
    fn test_pop_onto_untracked_record_is_ignored() {
        // The landing record never got a state because nothing replaced it
        let mut history = controller("#/legacy");
        history.push_view(&ViewName::new("foo")).unwrap();

        assert_eq!(history.back(), None);
        assert_eq!(history.index(), 0);
    }
}
