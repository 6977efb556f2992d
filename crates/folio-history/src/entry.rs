//! History entry payload

use folio_fragments::ViewName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HistoryError;
use crate::locator::Locator;
use crate::Result;

/// State object attached to every record the controller creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub view: ViewName,
}

impl HistoryEntry {
    pub fn new(view: ViewName) -> Self {
        Self { view }
    }

    pub fn to_state(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Recover an entry from a popped state.
    ///
    /// Missing states (records created before the router took over) and
    /// states that are not `{"view": "<non-empty string>"}` are stale.
    pub fn from_state(state: Option<&Value>) -> Result<Self> {
        let state = state.ok_or_else(|| HistoryError::StaleEntry("no state".to_string()))?;

        let entry: HistoryEntry = serde_json::from_value(state.clone())
            .map_err(|e| HistoryError::StaleEntry(format!("{}: {}", state, e)))?;

        if entry.view.is_empty() {
            return Err(HistoryError::StaleEntry("empty view name".to_string()));
        }

        Ok(entry)
    }

    pub fn locator(&self) -> String {
        Locator::for_view(&self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_shape() {
        let entry = HistoryEntry::new(ViewName::new("foundations/colors"));
        assert_eq!(
            entry.to_state().unwrap(),
            json!({ "view": "foundations/colors" })
        );
        assert_eq!(entry.locator(), "#/foundations/colors");
    }

    #[test]
    fn test_recover_valid_state() {
        let state = json!({ "view": "foo", "scroll": 120 });
        let entry = HistoryEntry::from_state(Some(&state)).unwrap();
        assert_eq!(entry.view, "foo");
    }

    #[test]
    fn test_stale_states() {
        let stale = [
            None,
            Some(json!(null)),
            Some(json!("foo")),
            Some(json!({})),
            Some(json!({ "view": 42 })),
            Some(json!({ "view": "" })),
            Some(json!({ "page": "foo" })),
        ];

        for state in stale {
            assert!(
                matches!(
                    HistoryEntry::from_state(state.as_ref()),
                    Err(HistoryError::StaleEntry(_))
                ),
                "expected stale: {:?}",
                state
            );
        }
    }
}
