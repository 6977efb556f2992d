//! Browser history model
//!
//! [`BrowserHistory`] is the subset of the browser's `history` object the
//! controller relies on. [`MemoryHistory`] implements it in memory for
//! headless hosts and tests.

use serde_json::Value;

/// Payload delivered when the user moves through the stack
#[derive(Debug, Clone, PartialEq)]
pub struct PopEvent {
    pub state: Option<Value>,
    pub location: String,
}

pub trait BrowserHistory: Send {
    /// Append a record after the current one, dropping any forward records
    fn push_state(&mut self, state: Value, location: &str);

    /// Overwrite the current record
    fn replace_state(&mut self, state: Value, location: &str);

    /// State of the current record
    fn state(&self) -> Option<&Value>;

    /// Address of the current record
    fn location(&self) -> &str;

    /// Number of records in the stack
    fn len(&self) -> usize;

    /// Position of the current record
    fn index(&self) -> usize;

    /// Move by `delta` records; `None` when the move is out of range
    fn go(&mut self, delta: isize) -> Option<PopEvent>;

    fn back(&mut self) -> Option<PopEvent> {
        self.go(-1)
    }

    fn forward(&mut self) -> Option<PopEvent> {
        self.go(1)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct Record {
    state: Option<Value>,
    location: String,
}

#[derive(Debug, Clone)]
pub struct MemoryHistory {
    records: Vec<Record>,
    index: usize,
}

impl MemoryHistory {
    /// A fresh stack holding the page the user landed on, without state
    pub fn new(initial_location: impl Into<String>) -> Self {
        Self {
            records: vec![Record {
                state: None,
                location: initial_location.into(),
            }],
            index: 0,
        }
    }

    /// Replace the state of any record, the way another script sharing the
    /// page could
    pub fn overwrite_state(&mut self, index: usize, state: Option<Value>) {
        if let Some(record) = self.records.get_mut(index) {
            record.state = state;
        }
    }

    /// Locations of all records, oldest first
    pub fn locations(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.location.as_str()).collect()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl BrowserHistory for MemoryHistory {
    fn push_state(&mut self, state: Value, location: &str) {
        self.records.truncate(self.index + 1);
        self.records.push(Record {
            state: Some(state),
            location: location.to_string(),
        });
        self.index = self.records.len() - 1;
    }

    fn replace_state(&mut self, state: Value, location: &str) {
        let record = &mut self.records[self.index];
        record.state = Some(state);
        record.location = location.to_string();
    }

    fn state(&self) -> Option<&Value> {
        self.records[self.index].state.as_ref()
    }

    fn location(&self) -> &str {
        &self.records[self.index].location
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn index(&self) -> usize {
        self.index
    }

    fn go(&mut self, delta: isize) -> Option<PopEvent> {
        if delta == 0 {
            return None;
        }

        let target = self.index.checked_add_signed(delta)?;
        let record = self.records.get(target)?;

        let event = PopEvent {
            state: record.state.clone(),
            location: record.location.clone(),
        };
        self.index = target;

        Some(event)
    }
}
