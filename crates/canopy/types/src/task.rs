//! Task declarations: ordered sequences of steps delegated to agents

use crate::units::parse_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A declared task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskDecl {
    /// Task name, unique across the program
    pub name: String,
    /// Source line of the declaration (1-based)
    pub line: usize,
    /// Name of the input the task consumes
    pub input: Option<String>,
    /// Raw priority string (`"high"`); see [`TaskDecl::priority`]
    pub priority: Option<String>,
    /// Raw deadline string (`"30 minutes"`); see [`TaskDecl::deadline`]
    pub deadline: Option<String>,
    /// Steps in declaration order — the order is the execution sequence
    pub steps: Vec<Step>,
}

impl TaskDecl {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            input: None,
            priority: None,
            deadline: None,
            steps: Vec::new(),
        }
    }

    /// Parsed priority, defaulting to [`Priority::Normal`] when absent.
    ///
    /// Returns `None` for a declared-but-invalid priority; the validator
    /// reports that case as a semantic error.
    pub fn priority(&self) -> Option<Priority> {
        match self.priority.as_deref() {
            None => Some(Priority::Normal),
            Some(raw) => Priority::parse(raw),
        }
    }

    /// Parsed deadline. `None` when no deadline was declared or the
    /// declared value does not parse (the validator reports the latter).
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
            .as_deref()
            .and_then(|raw| parse_duration(raw).ok())
    }
}

/// One step of a task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// What the step does
    pub verb: StepVerb,
    /// The agent the step delegates to
    pub agent: String,
    /// Source line of the step (1-based)
    pub line: usize,
}

/// Step verbs, inherently sequential: `route` resolves the handling agent
/// before `validate` and `process` run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepVerb {
    Route,
    Validate,
    Process,
}

impl StepVerb {
    /// The registry capability this verb invokes, if any.
    ///
    /// `route` only assigns; it needs the agent to exist but calls nothing.
    pub fn required_capability(&self) -> Option<&'static str> {
        match self {
            Self::Route => None,
            Self::Validate => Some("validate"),
            Self::Process => Some("process"),
        }
    }
}

impl std::fmt::Display for StepVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Route => write!(f, "route"),
            Self::Validate => write!(f, "validate"),
            Self::Process => write!(f, "process"),
        }
    }
}

/// Task priority
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with(priority: Option<&str>, deadline: Option<&str>) -> TaskDecl {
        let mut task = TaskDecl::new("process_customer_data", 1);
        task.priority = priority.map(String::from);
        task.deadline = deadline.map(String::from);
        task
    }

    #[test]
    fn test_priority_defaults_to_normal() {
        assert_eq!(task_with(None, None).priority(), Some(Priority::Normal));
    }

    #[test]
    fn test_priority_parses_declared_value() {
        assert_eq!(task_with(Some("high"), None).priority(), Some(Priority::High));
        assert_eq!(task_with(Some("urgent"), None).priority(), None);
    }

    #[test]
    fn test_deadline_parses() {
        assert_eq!(
            task_with(None, Some("30 minutes")).deadline(),
            Some(Duration::from_secs(1800))
        );
        assert_eq!(task_with(None, Some("whenever")).deadline(), None);
        assert_eq!(task_with(None, None).deadline(), None);
    }

    #[test]
    fn test_step_verb_capabilities() {
        assert_eq!(StepVerb::Route.required_capability(), None);
        assert_eq!(StepVerb::Validate.required_capability(), Some("validate"));
        assert_eq!(StepVerb::Process.required_capability(), Some("process"));
    }
}
