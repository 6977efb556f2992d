//! Output for completed navigations and the final site state

use chrono::{DateTime, Utc};
use folio_core::{CoreError, NavigationEvent, NavigationOutcome, NavigationState, SidebarSnapshot, Theme};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NavigationInfo {
    pub view: String,
    pub sequence: u64,
    pub kind: String,
    pub outcome: String,
    pub completed_at: DateTime<Utc>,
}

impl From<&NavigationEvent> for NavigationInfo {
    fn from(event: &NavigationEvent) -> Self {
        Self {
            view: event.view.to_string(),
            sequence: event.sequence,
            kind: event.kind.as_str().to_string(),
            outcome: event.outcome.as_str().to_string(),
            completed_at: event.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepResult<T> {
    pub step: String,
    pub rendered: bool,
    pub data: Option<T>,
    pub note: Option<String>,
}

impl<T> StepResult<T> {
    pub fn ok(step: impl Into<String>, data: T) -> Self {
        Self {
            step: step.into(),
            rendered: true,
            data: Some(data),
            note: None,
        }
    }

    pub fn skipped(step: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            rendered: false,
            data: None,
            note: Some(note.into()),
        }
    }
}

impl StepResult<NavigationInfo> {
    pub fn from_outcome(step: impl Into<String>, outcome: &NavigationOutcome) -> Self {
        match outcome {
            NavigationOutcome::Rendered(event) => Self::ok(step, NavigationInfo::from(event)),
            NavigationOutcome::Superseded { view, sequence } => Self::skipped(
                step,
                format!("render of {} (#{}) superseded", view, sequence),
            ),
            NavigationOutcome::Ignored => Self::skipped(step, "no history entry to restore"),
        }
    }

    pub fn line(&self) -> String {
        match (&self.data, &self.note) {
            (Some(info), _) => format!(
                "{:<12} {:<28} {:<14} #{} {}",
                self.step, info.view, info.outcome, info.sequence, info.kind
            ),
            (None, Some(note)) => format!("{:<12} {}", self.step, note),
            (None, None) => self.step.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FinalState {
    pub state: NavigationState,
    pub location: String,
    pub theme: Theme,
    pub scrollspy_active: Option<String>,
    pub sidebar: Option<SidebarSnapshot>,
    pub links: Vec<String>,
}

impl FinalState {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("view         {}", self.state.current_view),
            format!("location     {}", self.location),
            format!("history      {}", self.state.history_depth),
            format!("theme        {}", self.theme),
        ];
        if let Some(active) = &self.scrollspy_active {
            lines.push(format!("section      {}", active));
        }
        if let Some(sidebar) = &self.sidebar {
            if let Some(active) = &sidebar.active {
                lines.push(format!("sidebar      {}", active));
            }
        }
        if !self.links.is_empty() {
            lines.push(format!("links        {}", self.links.join(", ")));
        }
        lines
    }
}

pub struct Reporter {
    json: bool,
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn step(&self, label: &str, outcome: &NavigationOutcome) -> anyhow::Result<()> {
        let result = StepResult::from_outcome(label, outcome);
        if self.json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("{}", result.line());
        }
        Ok(())
    }

    pub fn rejected(&self, label: &str, error: &CoreError) -> anyhow::Result<()> {
        tracing::warn!(step = label, error = %error, "Step rejected");
        let result = StepResult::<NavigationInfo>::skipped(label, error.to_string());
        if self.json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("{}", result.line());
        }
        Ok(())
    }

    pub fn finish(&self, state: &FinalState) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(state)?);
        } else {
            println!();
            for line in state.lines() {
                println!("{}", line);
            }
        }
        Ok(())
    }
}
