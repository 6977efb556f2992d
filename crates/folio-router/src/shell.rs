//! The shell: the persistent container fragments are injected into
//!
//! A host implements [`Shell`] over its real document; [`HeadlessShell`]
//! keeps everything in memory. Event listeners live in a
//! [`ListenerRegistry`] owned by the shell, so they survive content swaps
//! and must be detached explicitly.

use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::ShellError;

/// Vertical extent of an element, relative to the top of the shell content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBox {
    pub top: f64,
    pub height: f64,
}

impl SectionBox {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Half-open containment: `top <= offset < bottom`
    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.top && offset < self.bottom()
    }

    /// The same box moved up by `offset`
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            top: self.top - offset,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// The shell was scrolled to `top`
    Scroll { top: f64 },
    /// The element with id `target` was clicked
    Click { target: String },
}

impl ShellEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ShellEvent::Scroll { .. } => EventKind::Scroll,
            ShellEvent::Click { target } => EventKind::Click(target.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    /// Clicks on one element, by id
    Click(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ShellEvent) + Send + Sync>;

#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&ShellEvent) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, kind, Arc::new(listener)));
        id
    }

    /// Detach a listener; `false` if it was not attached
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn is_attached(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(listener_id, _, _)| *listener_id == id)
    }

    pub fn count(&self, kind: &EventKind) -> usize {
        self.listeners.iter().filter(|(_, k, _)| k == kind).count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listeners for `event`, in attachment order. Returned as handles so the
    /// caller can invoke them after releasing the shell.
    pub fn matching(&self, event: &ShellEvent) -> Vec<Listener> {
        let kind = event.kind();
        self.listeners
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect()
    }
}

pub trait Shell: Send {
    /// Current markup
    fn content(&self) -> &str;

    /// Replace the markup verbatim
    fn replace_content(&mut self, html: &str) -> Result<(), ShellError>;

    fn scroll_top(&self) -> f64;

    fn set_scroll_top(&mut self, offset: f64);

    /// Layout box of the element with `id` inside the current content
    fn element_box(&self, id: &str) -> Option<SectionBox>;

    /// Whether an element with `id` exists anywhere on the page
    fn has_element(&self, id: &str) -> bool;

    fn listeners(&self) -> &ListenerRegistry;

    fn listeners_mut(&mut self) -> &mut ListenerRegistry;
}

/// What a navigation subscriber may do with the shell: read content and
/// geometry, manage its listeners. It cannot replace content or scroll.
pub struct ShellContext<'a> {
    shell: &'a mut dyn Shell,
}

impl<'a> ShellContext<'a> {
    pub fn new(shell: &'a mut dyn Shell) -> Self {
        Self { shell }
    }

    pub fn content(&self) -> &str {
        self.shell.content()
    }

    pub fn scroll_top(&self) -> f64 {
        self.shell.scroll_top()
    }

    pub fn element_box(&self, id: &str) -> Option<SectionBox> {
        self.shell.element_box(id)
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.shell.has_element(id)
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&ShellEvent) + Send + Sync + 'static,
    {
        self.shell.listeners_mut().add(kind, listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.shell.listeners_mut().remove(id)
    }

    pub fn is_attached(&self, id: ListenerId) -> bool {
        self.shell.listeners().is_attached(id)
    }

    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.shell.listeners().count(kind)
    }
}

/// In-memory shell.
///
/// Geometry comes from boxes registered with [`HeadlessShell::set_box`], or,
/// with [`HeadlessShell::with_stacked_sections`], from stacking every
/// `section[id]` of the content in document order.
#[derive(Default)]
pub struct HeadlessShell {
    content: String,
    scroll_top: f64,
    content_ids: HashSet<String>,
    chrome_ids: HashSet<String>,
    boxes: HashMap<String, SectionBox>,
    stacked_height: Option<f64>,
    content_limit: Option<usize>,
    listeners: ListenerRegistry,
}

impl HeadlessShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of persistent elements outside the shell (toggle buttons, sidebar)
    pub fn with_chrome<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chrome_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_stacked_sections(mut self, height: f64) -> Self {
        self.stacked_height = Some(height);
        self
    }

    /// Refuse content larger than `bytes`
    pub fn with_content_limit(mut self, bytes: usize) -> Self {
        self.content_limit = Some(bytes);
        self
    }

    pub fn with_box(mut self, id: impl Into<String>, section: SectionBox) -> Self {
        self.set_box(id, section);
        self
    }

    pub fn set_box(&mut self, id: impl Into<String>, section: SectionBox) {
        self.boxes.insert(id.into(), section);
    }

    fn collect_ids(html: &str) -> Vec<(String, bool)> {
        let doc = Html::parse_fragment(html);
        let Ok(sel) = Selector::parse("[id]") else {
            return Vec::new();
        };

        doc.select(&sel)
            .filter_map(|el| {
                let is_section = el.value().name() == "section";
                el.value().id().map(|id| (id.to_string(), is_section))
            })
            .collect()
    }
}

impl Shell for HeadlessShell {
    fn content(&self) -> &str {
        &self.content
    }

    fn replace_content(&mut self, html: &str) -> Result<(), ShellError> {
        if let Some(limit) = self.content_limit {
            if html.len() > limit {
                return Err(ShellError::ContentTooLarge {
                    size: html.len(),
                    limit,
                });
            }
        }

        let ids = Self::collect_ids(html);

        if let Some(height) = self.stacked_height {
            self.boxes.clear();
            let mut top = 0.0;
            for (id, _) in ids.iter().filter(|(_, is_section)| *is_section) {
                self.boxes.insert(id.clone(), SectionBox::new(top, height));
                top += height;
            }
        }

        self.content_ids = ids.into_iter().map(|(id, _)| id).collect();
        self.content = html.to_string();

        Ok(())
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = offset.max(0.0);
    }

    fn element_box(&self, id: &str) -> Option<SectionBox> {
        if !self.content_ids.contains(id) {
            return None;
        }
        self.boxes.get(id).copied()
    }

    fn has_element(&self, id: &str) -> bool {
        self.content_ids.contains(id) || self.chrome_ids.contains(id)
    }

    fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }
}
